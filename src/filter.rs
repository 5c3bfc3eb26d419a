// filter.rs — Choice of smoothing applied to the derivative grids.
//
// Two interchangeable strategies, selected once per detection run:
//   Gaussian { sigma } → convolution::gaussian_filter (separable)
//   Box                → integral::box_filter (summed-area table)
//
// Both shrink the grid by 2·filter_range on each axis. A filter_range of 0
// skips filtering entirely and hands the input back unchanged.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::convolution::gaussian_filter;
use crate::image::Image;
use crate::integral::box_filter;

/// Sigma values at or below this select the box filter in
/// [`Smoothing::from_sigma`].
pub const BOX_SIGMA_EPSILON: f32 = 1e-6;

/// Smoothing strategy for the structure tensor window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Smoothing {
    /// Gaussian window with the given standard deviation (pixels).
    Gaussian { sigma: f32 },
    /// Uniform (mean) window.
    Box,
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::Gaussian { sigma: 1.0 }
    }
}

impl Smoothing {
    /// A sigma of (nearly) zero selects the box filter, anything else a
    /// Gaussian with that sigma.
    pub fn from_sigma(sigma: f32) -> Self {
        if sigma.abs() <= BOX_SIGMA_EPSILON {
            Smoothing::Box
        } else {
            Smoothing::Gaussian { sigma }
        }
    }

    /// Boolean form: `gauss == true` selects a Gaussian with `sigma`.
    pub fn from_flag(gauss: bool, sigma: f32) -> Self {
        if gauss {
            Smoothing::Gaussian { sigma }
        } else {
            Smoothing::Box
        }
    }

    /// Smooth `image` over `(2·filter_range + 1)²` windows.
    ///
    /// Consumes the input. With `filter_range == 0` the input is returned as
    /// is; otherwise the result is a new `(W-2r) × (H-2r)` grid and the input
    /// is dropped.
    ///
    /// # Panics
    /// Panics if `filter_range > 0` and either side of `image` is below
    /// `2·filter_range + 1`, or for a Gaussian with `sigma <= 0`.
    pub fn apply(self, image: Image<f32>, filter_range: usize) -> Image<f32> {
        if filter_range == 0 {
            return image;
        }
        trace!(
            "{:?} filter r={filter_range} on {}×{}",
            self,
            image.width(),
            image.height()
        );
        match self {
            Smoothing::Gaussian { sigma } => gaussian_filter(&image, filter_range, sigma),
            Smoothing::Box => box_filter(&image, filter_range),
        }
    }
}
