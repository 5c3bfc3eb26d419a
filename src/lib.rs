// harris_corners: single-scale Harris interest point detection.
//
// Pipeline, leaves first:
//   convert      → 8-bit gray/color bytes to a normalized f32 grid
//   gradient     → Sobel derivatives Ix, Iy, Ixy
//   filter       → Gaussian (convolution) or box (integral) smoothing
//   harris       → structure tensor response and the detector entry point
//   nms          → percentile selection + radius suppression
//
// Features:
//   rayon (default): row-parallel loops, output is identical without it
//   tracing: spans on the detector entry points

pub mod config;
pub mod convert;
pub mod convolution;
pub mod error;
pub mod filter;
pub mod gradient;
pub mod harris;
pub mod image;
pub mod integral;
pub mod nms;

pub use config::{load_config, HarrisConfig};
pub use error::{Error, Result};
pub use filter::Smoothing;
pub use harris::HarrisDetector;
pub use nms::KeyPoint;
