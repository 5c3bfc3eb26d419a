// gradient.rs — First derivatives via the separable 3×3 Sobel operator.
//
// The Sobel kernel is the outer product of a [1, 2, 1] triangle (smoothing)
// and a [-1, 0, 1] difference. Both grids are built from two valid-region
// smoothing passes over the source:
//
//   vs = [1, 2, 1] down each column   →  W × (H-2)
//   hs = [1, 2, 1] along each row     →  (W-2) × H
//
//   Ix(x, y)  = hs(x, y) - hs(x, y + 2)
//   Iy(x, y)  = vs(x + 2, y) - vs(x, y)
//   Ixy(x, y) = Ix(x, y) · Iy(x, y)
//
// Only pixels with a full 3×3 neighborhood are computed, so every derivative
// grid is exactly (W-2) × (H-2) and derivative (x, y) sits on source
// (x + 1, y + 1).

use crate::convolution::{convolve_cols_valid, convolve_rows_valid};
use crate::filter::Smoothing;
use crate::image::{Image, Pixel};

/// Sobel smoothing taps.
const TRIANGLE: [f32; 3] = [1.0, 2.0, 1.0];

/// First-derivative grids of one image. All three always share dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivatives {
    pub ix: Image<f32>,
    pub iy: Image<f32>,
    /// Pointwise product `ix · iy` (smoothed along with the others when a
    /// filter is applied).
    pub ixy: Image<f32>,
}

impl Derivatives {
    #[inline]
    pub fn width(&self) -> usize {
        self.ix.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.ix.height()
    }

    /// Smooth each derivative grid from its own source.
    ///
    /// Consumes `self`; the returned grids are `2·filter_range` smaller on each
    /// axis (unchanged for `filter_range == 0`). With the `rayon` feature the
    /// three filters run concurrently.
    ///
    /// # Panics
    /// Panics if `filter_range > 0` and the grids are smaller than
    /// `2·filter_range + 1` on either axis.
    pub fn smoothed(self, smoothing: Smoothing, filter_range: usize) -> Derivatives {
        let Derivatives { ix, iy, ixy } = self;

        #[cfg(feature = "rayon")]
        let (ix, (iy, ixy)) = rayon::join(
            || smoothing.apply(ix, filter_range),
            || {
                rayon::join(
                    || smoothing.apply(iy, filter_range),
                    || smoothing.apply(ixy, filter_range),
                )
            },
        );

        #[cfg(not(feature = "rayon"))]
        let (ix, iy, ixy) = (
            smoothing.apply(ix, filter_range),
            smoothing.apply(iy, filter_range),
            smoothing.apply(ixy, filter_range),
        );

        Derivatives { ix, iy, ixy }
    }
}

/// Compute `Ix`, `Iy` and `Ixy` for `src`.
///
/// # Panics
/// Panics if `src` is smaller than 3×3.
pub fn compute_derivatives<T: Pixel>(src: &Image<T>) -> Derivatives {
    assert!(
        src.width() >= 3 && src.height() >= 3,
        "derivatives need at least a 3×3 image, got {}×{}",
        src.width(),
        src.height()
    );

    let vertical = convolve_cols_valid(src, &TRIANGLE);
    let horizontal = convolve_rows_valid(src, &TRIANGLE);

    let w = src.width() - 2;
    let h = src.height() - 2;

    let mut ix = Image::<f32>::new(w, h);
    ix.for_each_row_mut(|y, row| {
        let upper = &horizontal.row(y)[..w];
        let lower = &horizontal.row(y + 2)[..w];
        for ((out, &a), &b) in row.iter_mut().zip(upper).zip(lower) {
            *out = a - b;
        }
    });

    let mut iy = Image::<f32>::new(w, h);
    iy.for_each_row_mut(|y, row| {
        let src_row = vertical.row(y);
        for (x, out) in row.iter_mut().enumerate() {
            *out = src_row[x + 2] - src_row[x];
        }
    });

    let mut ixy = Image::<f32>::new(w, h);
    ixy.for_each_row_mut(|y, row| {
        for ((out, &gx), &gy) in row.iter_mut().zip(ix.row(y)).zip(iy.row(y)) {
            *out = gx * gy;
        }
    });

    Derivatives { ix, iy, ixy }
}
