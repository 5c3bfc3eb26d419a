// convert.rs — Image ingestion and pixel type conversions.
//
// The detector consumes a single-channel f32 grid with intensities in
// [0, 1]. This module turns 8-bit gray or color data into that grid:
//   bytes → f32 (v / 255)
//   3 channels → 1 channel (channel average)
// Anything that is neither gray nor color is rejected up front, before any
// processing happens.

use ::image::{DynamicImage, GenericImageView};
use log::trace;

use crate::error::{Error, Result};
use crate::image::{Image, Pixel};

/// Ingest interleaved 8-bit pixel data as a normalized gray f32 image.
///
/// `channels` must be 1 (gray) or 3 (color, desaturated by averaging the
/// three channels).
///
/// # Errors
/// `Error::InvalidChannels` for any other channel count and
/// `Error::SizeMismatch` if `data.len() != width * height * channels`. A
/// product that overflows `usize` is reported as `expected: usize::MAX`.
pub fn ingest_bytes(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
) -> Result<Image<f32>> {
    if channels != 1 && channels != 3 {
        return Err(Error::InvalidChannels { channels });
    }
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .unwrap_or(usize::MAX);
    if data.len() != expected {
        return Err(Error::SizeMismatch {
            expected,
            actual: data.len(),
        });
    }
    trace!("ingest {width}×{height} image with {channels} channel(s)");

    let pixels: Vec<f32> = if channels == 1 {
        data.iter().map(|&v| v as f32 / 255.0).collect()
    } else {
        data.chunks_exact(3)
            .map(|px| {
                let sum = px[0] as f32 + px[1] as f32 + px[2] as f32;
                sum / 3.0 / 255.0
            })
            .collect()
    };
    Ok(Image::from_vec(width, height, pixels))
}

/// Ingest an image decoded by the `image` crate.
///
/// The channel count comes from the decoded color type; samples deeper than
/// 8 bits are reduced to 8 bits first.
pub fn from_dynamic_image(img: &DynamicImage) -> Result<Image<f32>> {
    let (w, h) = img.dimensions();
    let (w, h) = (w as usize, h as usize);
    match img.color().channel_count() {
        1 => ingest_bytes(img.to_luma8().as_raw(), w, h, 1),
        3 => ingest_bytes(img.to_rgb8().as_raw(), w, h, 3),
        n => Err(Error::InvalidChannels {
            channels: n as usize,
        }),
    }
}

/// Convert an Image<u8> to Image<f32> with normalized values in [0.0, 1.0].
pub fn u8_to_f32_normalized(src: &Image<u8>) -> Image<f32> {
    let data = src.as_slice().iter().map(|&v| v as f32 / 255.0).collect();
    Image::from_vec(src.width(), src.height(), data)
}

/// Convert an Image<u8> to Image<f32> preserving raw values (42 → 42.0).
pub fn u8_to_f32_raw(src: &Image<u8>) -> Image<f32> {
    let data = src.as_slice().iter().map(|&v| v.to_f32()).collect();
    Image::from_vec(src.width(), src.height(), data)
}

/// Convert an Image<f32> (assumed [0.0, 1.0]) to Image<u8>.
/// Values are clamped to [0, 255] and rounded.
pub fn f32_normalized_to_u8(src: &Image<f32>) -> Image<u8> {
    let data = src.as_slice().iter().map(|&v| u8::from_f32(v * 255.0)).collect();
    Image::from_vec(src.width(), src.height(), data)
}

/// Rescale an arbitrary f32 grid (e.g. a response map) to [0, 255] for display.
///
/// The maximum maps to 255. An all-zero or empty grid maps to all zeros.
pub fn response_to_u8(src: &Image<f32>) -> Image<u8> {
    let max = src.as_slice().iter().copied().fold(0.0f32, f32::max);
    if max <= 0.0 {
        return Image::new(src.width(), src.height());
    }
    let data = src
        .as_slice()
        .iter()
        .map(|&v| u8::from_f32(v / max * 255.0))
        .collect();
    Image::from_vec(src.width(), src.height(), data)
}
