//! Shared test utilities for the imgfit test suite.
//!
//! Fixtures are synthesized at test time with the `image` encoders rather
//! than checked in, so every test gets files of exactly the size it asks for.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let source = tmp.path().join("wide.png");
//! write_image(&source, RasterFormat::Png, 200, 100);
//! // ... shrink into `output` ...
//! assert_jpeg_dimensions(&output, 100, 50);
//! ```

use crate::imaging::RasterFormat;
use image::{DynamicImage, Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Fixture writers
// =========================================================================

/// A gradient that differs per pixel, so resampling has something to average.
fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    })
}

/// Write an opaque image of the given format and size.
pub fn write_image(path: &Path, format: RasterFormat, width: u32, height: u32) {
    let img = DynamicImage::ImageRgba8(gradient(width, height));
    let img = match format {
        // JPEG has no alpha channel
        RasterFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };
    img.save_with_format(path, format.image_format())
        .unwrap_or_else(|e| panic!("failed to write {format} fixture: {e}"));
}

/// Write a fully transparent image (every pixel `rgba(0, 0, 0, 0)`).
pub fn write_transparent(path: &Path, format: RasterFormat, width: u32, height: u32) {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    DynamicImage::ImageRgba8(img)
        .save_with_format(path, format.image_format())
        .unwrap_or_else(|e| panic!("failed to write {format} fixture: {e}"));
}

/// Write the first bytes of a little-endian TIFF. Enough for sniffing only.
pub fn write_tiff_stub(path: &Path) {
    let mut bytes = b"II*\0\x08\0\0\0".to_vec();
    bytes.resize(64, 0);
    std::fs::write(path, bytes).unwrap();
}

// =========================================================================
// Readers
// =========================================================================

/// Open by content rather than extension; outputs are often extensionless.
fn open_guessed(path: &Path) -> image::ImageReader<std::io::BufReader<std::fs::File>> {
    image::ImageReader::open(path)
        .unwrap()
        .with_guessed_format()
        .unwrap()
}

// =========================================================================
// Assertions
// =========================================================================

/// Decode a written file and check its format and size.
pub fn assert_jpeg_dimensions(path: &Path, width: u32, height: u32) {
    let bytes = std::fs::read(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    assert_eq!(
        image::guess_format(&bytes).unwrap(),
        image::ImageFormat::Jpeg,
        "{} is not a JPEG",
        path.display()
    );
    let (w, h) = open_guessed(path).into_dimensions().unwrap();
    assert_eq!((w, h), (width, height), "dimensions of {}", path.display());
}

/// Decode a JPEG and return the RGB value of one pixel.
pub fn pixel_at(path: &Path, x: u32, y: u32) -> [u8; 3] {
    let img = open_guessed(path).decode().unwrap().to_rgb8();
    img.get_pixel(x, y).0
}

/// Assert two colors match within JPEG's lossy tolerance.
pub fn assert_color_near(actual: [u8; 3], expected: [u8; 3]) {
    let close = actual
        .iter()
        .zip(expected.iter())
        .all(|(a, e)| a.abs_diff(*e) <= 8);
    assert!(close, "expected ~{expected:?}, got {actual:?}");
}
