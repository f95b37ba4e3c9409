//! Image processing backend trait and shared error type.
//!
//! The [`ImageBackend`] trait is the boundary to the raster primitives the
//! shrink pipeline relies on: decode one of the supported containers,
//! resample a raster to exact dimensions, and encode a raster as JPEG.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests substitute a mock to observe the pipeline and to simulate
//! failures the real primitives rarely produce.

use super::detect::RasterFormat;
use super::params::Quality;
use image::{DynamicImage, RgbImage};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Resample failed: {0}")]
    Resample(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Raster primitives used by the shrink pipeline.
///
/// Implementations hold no per-call state; one backend serves any number of
/// concurrent operations.
pub trait ImageBackend: Sync {
    /// Decode the first frame of `path`, which is known to be `format`.
    fn decode(&self, path: &Path, format: RasterFormat) -> Result<DynamicImage, BackendError>;

    /// Resample `raster` to exactly `width` x `height` with an averaging filter.
    fn resample(
        &self,
        raster: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, BackendError>;

    /// Encode an opaque raster as JPEG into `output`.
    fn encode_jpeg(
        &self,
        raster: &RgbImage,
        output: &mut dyn Write,
        quality: Quality,
    ) -> Result<(), BackendError>;
}
