// error.rs — Failures raised by the detector entry points.
//
// All of these are precondition violations: the pipeline itself is a pure
// function of its inputs, so a failed call means the input or configuration
// must be corrected before calling again.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Byte image with a channel count other than 1 (gray) or 3 (color).
    InvalidChannels { channels: usize },
    /// Pixel buffer length does not match `width * height * channels`.
    SizeMismatch { expected: usize, actual: usize },
    /// Image cannot hold a single response pixel for the configured filter range.
    ImageTooSmall {
        width: usize,
        height: usize,
        min: usize,
    },
    /// Configuration value outside its valid range.
    InvalidConfig(String),
    /// Configuration file could not be read or parsed.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannels { channels } => {
                write!(f, "gray or color image expected, got {channels} channels")
            }
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::ImageTooSmall { width, height, min } => write!(
                f,
                "image {width}×{height} too small, both sides must be at least {min}"
            ),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::Config(msg) => write!(f, "failed to load configuration: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
