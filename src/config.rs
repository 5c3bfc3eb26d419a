// config.rs — Detection parameters and their JSON form.
//
// A configuration is fixed for one detection run: the detector takes its own
// copy at construction and validates it once.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::Smoothing;

/// Parameters of one Harris detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarrisConfig {
    /// Harris sensitivity constant. Typical range: 0.04–0.06.
    pub k: f32,
    /// Half-size of the smoothing window applied to the derivatives.
    /// 0 disables smoothing.
    pub filter_range: usize,
    /// Smoothing strategy for the derivatives.
    pub smoothing: Smoothing,
    /// Fraction of response pixels to keep, in (0, 1].
    pub percentage: f64,
    /// Half-size of the square suppressed around each accepted keypoint.
    pub suppression_radius: usize,
}

impl Default for HarrisConfig {
    fn default() -> Self {
        HarrisConfig {
            k: 0.04,
            filter_range: 1,
            smoothing: Smoothing::default(),
            percentage: 0.01,
            suppression_radius: 4,
        }
    }
}

impl HarrisConfig {
    /// Build a configuration where `sigma ≈ 0` selects the box filter.
    pub fn with_sigma(
        k: f32,
        filter_range: usize,
        sigma: f32,
        percentage: f64,
        suppression_radius: usize,
    ) -> Self {
        HarrisConfig {
            k,
            filter_range,
            smoothing: Smoothing::from_sigma(sigma),
            percentage,
            suppression_radius,
        }
    }

    /// Offset from response-grid coordinates back to input coordinates:
    /// one pixel for the Sobel border plus the smoothing range.
    #[inline]
    pub fn coordinate_offset(&self) -> usize {
        1 + self.filter_range
    }

    /// Check every value against its valid range.
    pub fn validate(&self) -> Result<()> {
        if !self.k.is_finite() {
            return Err(Error::InvalidConfig(format!("k must be finite, got {}", self.k)));
        }
        if !(self.percentage > 0.0 && self.percentage <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "percentage must be in (0, 1], got {}",
                self.percentage
            )));
        }
        if let Smoothing::Gaussian { sigma } = self.smoothing {
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "gaussian sigma must be finite and positive, got {sigma}"
                )));
            }
        }
        Ok(())
    }
}

/// Load and validate a configuration from a JSON file. Missing fields take
/// their default values.
pub fn load_config(path: &Path) -> Result<HarrisConfig> {
    let data = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
    let config: HarrisConfig = serde_json::from_str(&data)
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
    config.validate()?;
    Ok(config)
}
