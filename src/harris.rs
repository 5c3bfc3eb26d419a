// harris.rs — Harris corner response and the detector entry point.
//
// Pipeline (each stage consumes the previous stage's grid):
//   1. Sobel derivatives Ix, Iy and the product Ixy   (W-2) × (H-2)
//   2. Smooth each grid with the configured window    -2r on each axis
//   3. Per pixel, with a = Ix², b = Iy², c = Ixy:
//        det   = a·b - c²
//        trace = a + b
//        R     = |det - k·trace²|
//   4. Percentile selection + radius suppression, shifted back by 1 + r
//
// The absolute value in step 3 departs from the textbook signed measure
// (where negative R marks edges): strong edges score high as well. It is
// kept for compatibility with existing keypoint output.

use ::image::DynamicImage;
use log::debug;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::config::HarrisConfig;
use crate::convert;
use crate::error::{Error, Result};
use crate::gradient::{compute_derivatives, Derivatives};
use crate::image::Image;
use crate::nms::{KeyPoint, MaximaSelector};

/// Harris response `|det(M) - k·trace(M)²|` for every pixel of `d`.
///
/// The structure tensor at each pixel is `[[Ix², Ixy], [Ixy, Iy²]]` built
/// from the (possibly smoothed) derivative grids. Output has the same size
/// as the derivative grids.
pub fn harris_response(d: &Derivatives, k: f32) -> Image<f32> {
    debug_assert!(d.ix.same_size(&d.iy) && d.ix.same_size(&d.ixy));
    let mut response = Image::<f32>::new(d.width(), d.height());
    response.for_each_row_mut(|y, row| {
        let ix = d.ix.row(y);
        let iy = d.iy.row(y);
        let ixy = d.ixy.row(y);
        for (x, out) in row.iter_mut().enumerate() {
            let a = ix[x] * ix[x];
            let b = iy[x] * iy[x];
            let c = ixy[x];
            let det = a * b - c * c;
            let trace = a + b;
            *out = (det - k * trace * trace).abs();
        }
    });
    response
}

/// Harris corner detector.
#[derive(Debug, Clone)]
pub struct HarrisDetector {
    config: HarrisConfig,
}

impl HarrisDetector {
    /// Create a detector after validating `config`.
    pub fn new(config: HarrisConfig) -> Result<Self> {
        config.validate()?;
        Ok(HarrisDetector { config })
    }

    pub fn config(&self) -> &HarrisConfig {
        &self.config
    }

    /// Smallest side length that still yields one response pixel.
    pub fn min_image_size(&self) -> usize {
        3 + 2 * self.config.filter_range
    }

    fn check_size(&self, image: &Image<f32>) -> Result<()> {
        let min = self.min_image_size();
        if image.width() < min || image.height() < min {
            return Err(Error::ImageTooSmall {
                width: image.width(),
                height: image.height(),
                min,
            });
        }
        Ok(())
    }

    /// Sobel derivatives of `image`, smoothed with the configured window.
    pub fn derivatives(&self, image: &Image<f32>) -> Result<Derivatives> {
        self.check_size(image)?;
        let raw = compute_derivatives(image);
        debug!(
            "harris: {}×{} input → {}×{} derivatives",
            image.width(),
            image.height(),
            raw.width(),
            raw.height()
        );
        Ok(raw.smoothed(self.config.smoothing, self.config.filter_range))
    }

    /// Compute the response map of `image`.
    ///
    /// The map is `(W - 2 - 2r) × (H - 2 - 2r)`; response pixel `(x, y)`
    /// belongs to input pixel `(x + 1 + r, y + 1 + r)`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(w = image.width(), h = image.height()))
    )]
    pub fn corner_response(&self, image: &Image<f32>) -> Result<Image<f32>> {
        let d = self.derivatives(image)?;
        Ok(harris_response(&d, self.config.k))
    }

    /// Detect keypoints in a normalized gray image.
    ///
    /// Keypoints come strongest first, in input-image coordinates.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(w = image.width(), h = image.height()))
    )]
    pub fn detect(&self, image: &Image<f32>) -> Result<Vec<KeyPoint>> {
        let response = self.corner_response(image)?;
        let selector = MaximaSelector::new(self.config.percentage, self.config.suppression_radius);
        let keypoints = selector.select(&response, self.config.coordinate_offset());
        debug!(
            "harris: {} keypoints from {} response pixels (top_count {})",
            keypoints.len(),
            response.width() * response.height(),
            selector.top_count(response.width() * response.height())
        );
        Ok(keypoints)
    }

    /// Ingest interleaved 8-bit gray (1 channel) or color (3 channels) data
    /// and detect keypoints in it.
    pub fn detect_bytes(
        &self,
        data: &[u8],
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<Vec<KeyPoint>> {
        let image = convert::ingest_bytes(data, width, height, channels)?;
        self.detect(&image)
    }

    /// Detect keypoints in an image decoded by the `image` crate.
    pub fn detect_dynamic(&self, image: &DynamicImage) -> Result<Vec<KeyPoint>> {
        let image = convert::from_dynamic_image(image)?;
        self.detect(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Smoothing;

    /// White quadrant x ≥ c, y ≥ c on black: a single corner at (c, c).
    fn make_quadrant(size: usize, c: usize) -> Image<f32> {
        let mut img = Image::new(size, size);
        for y in c..size {
            for x in c..size {
                img.set(x, y, 1.0);
            }
        }
        img
    }

    fn config(smoothing: Smoothing) -> HarrisConfig {
        HarrisConfig {
            k: 0.04,
            filter_range: 1,
            smoothing,
            percentage: 0.02,
            suppression_radius: 2,
        }
    }

    #[test]
    fn test_response_formula() {
        let one = |v: f32| Image::from_vec(1, 1, vec![v]);
        let d = Derivatives {
            ix: one(2.0),
            iy: one(3.0),
            ixy: one(1.0),
        };
        // a = 4, b = 9, c = 1: det = 35, trace = 13, 35 - 0.04·169 = 28.24
        let r = harris_response(&d, 0.04);
        assert!((r.get(0, 0) - 28.24).abs() < 1e-4);

        // Negative inner value folds to positive: a = 4, b = 0, c = 0 → |0 - 0.04·16|
        let d = Derivatives {
            ix: one(2.0),
            iy: one(0.0),
            ixy: one(0.0),
        };
        let r = harris_response(&d, 0.04);
        assert!((r.get(0, 0) - 0.64).abs() < 1e-6);
    }

    #[test]
    fn test_response_dimensions() {
        let img = make_quadrant(20, 10);
        for r in 0..3 {
            let det = HarrisDetector::new(HarrisConfig {
                filter_range: r,
                ..config(Smoothing::Box)
            })
            .unwrap();
            let resp = det.corner_response(&img).unwrap();
            assert_eq!(resp.width(), 18 - 2 * r);
            assert_eq!(resp.height(), 18 - 2 * r);
        }
    }

    #[test]
    fn test_flat_image_zero_response() {
        let img = Image::filled(16, 12, 0.5f32);
        let det = HarrisDetector::new(config(Smoothing::Gaussian { sigma: 1.0 })).unwrap();
        let resp = det.corner_response(&img).unwrap();
        assert!(resp.pixels().all(|(_, _, v)| v == 0.0));
    }

    #[test]
    fn test_quadrant_corner_is_strongest() {
        let img = make_quadrant(24, 12);
        for smoothing in [Smoothing::Gaussian { sigma: 1.0 }, Smoothing::Box] {
            let det = HarrisDetector::new(config(smoothing)).unwrap();
            let kps = det.detect(&img).unwrap();
            assert!(!kps.is_empty());
            let best = kps[0];
            assert!(
                best.x.abs_diff(12) <= 2 && best.y.abs_diff(12) <= 2,
                "{smoothing:?}: strongest keypoint at ({}, {})",
                best.x,
                best.y
            );
        }
    }

    #[test]
    fn test_keypoints_sorted_by_response() {
        let img = make_quadrant(24, 12);
        let det = HarrisDetector::new(config(Smoothing::Box)).unwrap();
        let kps = det.detect(&img).unwrap();
        for pair in kps.windows(2) {
            assert!(pair[0].response >= pair[1].response);
        }
    }

    #[test]
    fn test_image_too_small() {
        let det = HarrisDetector::new(HarrisConfig {
            filter_range: 2,
            ..HarrisConfig::default()
        })
        .unwrap();
        assert_eq!(det.min_image_size(), 7);
        let err = det.detect(&Image::new(6, 20)).unwrap_err();
        assert_eq!(
            err,
            Error::ImageTooSmall {
                width: 6,
                height: 20,
                min: 7
            }
        );
        assert!(det.detect(&Image::new(7, 7)).is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = HarrisDetector::new(HarrisConfig {
            percentage: 0.0,
            ..HarrisConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_detect_bytes_rejects_bad_channels() {
        let det = HarrisDetector::new(HarrisConfig::default()).unwrap();
        let err = det.detect_bytes(&[0; 64], 4, 4, 4).unwrap_err();
        assert_eq!(err, Error::InvalidChannels { channels: 4 });
    }

    #[test]
    fn test_detect_bytes_gray_matches_float() {
        let mut bytes = vec![0u8; 24 * 24];
        for y in 12..24 {
            for x in 12..24 {
                bytes[y * 24 + x] = 255;
            }
        }
        let det = HarrisDetector::new(config(Smoothing::Box)).unwrap();
        let from_bytes = det.detect_bytes(&bytes, 24, 24, 1).unwrap();
        let from_float = det.detect(&make_quadrant(24, 12)).unwrap();
        assert_eq!(from_bytes, from_float);
    }
}
