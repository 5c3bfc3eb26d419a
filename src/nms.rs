// nms.rs — Percentile selection with radius-based non-maximum suppression.
//
// Selection walks all response pixels from strongest to weakest:
//
//   1. Enumerate every pixel as a candidate KeyPoint(x, y, response).
//   2. Stable sort by response, descending. Ties keep row-major order.
//   3. top_count = floor(candidates · percentage).
//   4. Accept a candidate unless its suppression-mask cell is already set;
//      on acceptance, set the mask over the (2·radius + 1)² square around
//      it, clipped to the grid.
//   5. Stop after top_count acceptances or when candidates run out.
//   6. Shift accepted points by `offset` into input-image coordinates.
//
// Step 4 is inherently sequential: each decision depends on the mask left
// by every stronger candidate. Only the sort runs in parallel.

use serde::{Deserialize, Serialize};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::image::Image;

/// A detected interest point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub x: usize,
    pub y: usize,
    /// Corner response at this pixel. Not normalized; see
    /// [`normalize_responses`].
    pub response: f32,
}

impl KeyPoint {
    pub fn new(x: usize, y: usize, response: f32) -> Self {
        KeyPoint { x, y, response }
    }

    /// The same point moved by `offset` along both axes.
    pub fn shifted(self, offset: usize) -> Self {
        KeyPoint {
            x: self.x + offset,
            y: self.y + offset,
            ..self
        }
    }
}

/// Every pixel of `response` as a candidate, strongest first.
///
/// The sort is stable, so equal responses stay in row-major order and the
/// result is identical with or without the `rayon` feature.
pub fn rank_candidates(response: &Image<f32>) -> Vec<KeyPoint> {
    let mut candidates: Vec<KeyPoint> = response
        .pixels()
        .map(|(x, y, r)| KeyPoint::new(x, y, r))
        .collect();

    #[cfg(feature = "rayon")]
    candidates.par_sort_by(|a, b| b.response.total_cmp(&a.response));
    #[cfg(not(feature = "rayon"))]
    candidates.sort_by(|a, b| b.response.total_cmp(&a.response));

    candidates
}

/// Relative slack allowed when flooring `total · percentage`.
const TOP_COUNT_TOLERANCE: f64 = 1e-9;

/// Percentile selection followed by radius suppression.
#[derive(Debug, Clone, Copy)]
pub struct MaximaSelector {
    /// Fraction of response pixels to keep, in (0, 1].
    pub percentage: f64,
    /// Half-size of the square suppressed around each accepted point.
    /// 0 suppresses only the point itself.
    pub suppression_radius: usize,
}

impl MaximaSelector {
    /// # Panics
    /// Panics if `percentage` is not in (0, 1].
    pub fn new(percentage: f64, suppression_radius: usize) -> Self {
        assert!(
            percentage > 0.0 && percentage <= 1.0,
            "percentage must be in (0, 1], got {percentage}"
        );
        MaximaSelector {
            percentage,
            suppression_radius,
        }
    }

    /// Number of keypoints requested out of `total` candidates:
    /// `floor(total · percentage)`.
    ///
    /// A product within `TOP_COUNT_TOLERANCE` (relative) of an integer counts
    /// as that integer, so decimal fractions such as 0.7 or 0.57 that have no
    /// exact binary form still give 7 of 10 and 57 of 100.
    pub fn top_count(&self, total: usize) -> usize {
        let exact = total as f64 * self.percentage;
        let nearest = exact.round();
        if (exact - nearest).abs() <= TOP_COUNT_TOLERANCE * nearest.max(1.0) {
            nearest as usize
        } else {
            exact.floor() as usize
        }
    }

    /// Select keypoints from a response grid.
    ///
    /// Returns at most `top_count(width · height)` points in acceptance order
    /// (strongest first), each shifted by `offset` on both axes. Fewer points
    /// come back when suppression exhausts the candidates first.
    pub fn select(&self, response: &Image<f32>, offset: usize) -> Vec<KeyPoint> {
        let candidates = rank_candidates(response);
        let top_count = self.top_count(candidates.len());

        let w = response.width();
        let h = response.height();
        let r = self.suppression_radius;
        let mut mask = Image::<u8>::new(w, h);
        let mut keypoints = Vec::with_capacity(top_count);

        for kp in candidates {
            if keypoints.len() >= top_count {
                break;
            }
            if mask.get(kp.x, kp.y) != 0 {
                continue;
            }
            keypoints.push(kp.shifted(offset));

            let x0 = kp.x.saturating_sub(r);
            let x1 = (kp.x + r + 1).min(w);
            for y in kp.y.saturating_sub(r)..(kp.y + r + 1).min(h) {
                mask.row_mut(y)[x0..x1].fill(1);
            }
        }

        keypoints
    }
}

/// Divide every response by the largest one so the strongest point is 1.0.
///
/// Leaves the slice untouched when it is empty or the maximum is not positive.
pub fn normalize_responses(keypoints: &mut [KeyPoint]) {
    let max = keypoints.iter().map(|kp| kp.response).fold(0.0f32, f32::max);
    if max <= 0.0 {
        return;
    }
    for kp in keypoints {
        kp.response /= max;
    }
}
