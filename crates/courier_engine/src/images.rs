use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::RgbImage;

use crate::{FailureKind, FetchError};

/// High-fidelity pages are upscaled by this factor before encoding.
pub const HIGH_FIDELITY_SCALE: f32 = 1.5;

const STANDARD_QUALITY: u8 = 85;
const HIGH_FIDELITY_QUALITY: u8 = 100;

/// Decodes any supported image and re-encodes it as an RGB JPEG.
pub fn normalize_to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, FetchError> {
    let img = decode(bytes)?;
    encode_jpeg(&img.to_rgb8(), STANDARD_QUALITY)
}

/// Decodes, upscales by [`HIGH_FIDELITY_SCALE`] with Lanczos resampling, and
/// encodes at maximum JPEG quality.
pub fn upscale_to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, FetchError> {
    let img = decode(bytes)?;
    let width = scaled(img.width());
    let height = scaled(img.height());
    let resized = img.resize_exact(width, height, FilterType::Lanczos3);
    encode_jpeg(&resized.to_rgb8(), HIGH_FIDELITY_QUALITY)
}

fn scaled(dim: u32) -> u32 {
    ((dim as f32 * HIGH_FIDELITY_SCALE) as u32).max(1)
}

fn decode(bytes: &[u8]) -> Result<image::DynamicImage, FetchError> {
    image::load_from_memory(bytes)
        .map_err(|err| FetchError::new(FailureKind::Image, err.to_string()))
}

fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>, FetchError> {
    let mut out = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode_image(img)
        .map_err(|err| FetchError::new(FailureKind::Image, err.to_string()))?;
    Ok(out.into_inner())
}
