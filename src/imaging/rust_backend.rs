//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP) | `image::ImageReader::with_format` (first frame only) |
//! | Resample | `image::imageops::resize` with the `Triangle` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! `Triangle` is a bilinear kernel that `image` widens by the scale factor
//! when shrinking, so every source pixel contributes to the average.

use super::backend::{BackendError, ImageBackend};
use super::detect::RasterFormat;
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, RgbImage};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path, format: RasterFormat) -> Result<DynamicImage, BackendError> {
        let file = File::open(path)?;
        let reader = ImageReader::with_format(BufReader::new(file), format.image_format());
        reader.decode().map_err(|e| {
            BackendError::Decode(format!("Failed to decode {}: {}", path.display(), e))
        })
    }

    fn resample(
        &self,
        raster: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::Resample(format!(
                "invalid target size {width}x{height}"
            )));
        }
        let resized = raster.resize_exact(width, height, FilterType::Triangle);
        if resized.width() != width || resized.height() != height {
            return Err(BackendError::Resample(format!(
                "resampler produced {}x{} instead of {width}x{height}",
                resized.width(),
                resized.height()
            )));
        }
        Ok(resized)
    }

    fn encode_jpeg(
        &self,
        raster: &RgbImage,
        output: &mut dyn Write,
        quality: Quality,
    ) -> Result<(), BackendError> {
        // The encoder's scale tables are defined for 1..=100
        let encoder = JpegEncoder::new_with_quality(output, quality.value().max(1));
        encoder
            .write_image(
                raster.as_raw(),
                raster.width(),
                raster.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {}", e)))
    }
}
