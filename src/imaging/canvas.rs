//! Destination canvas and transparency replacement.
//!
//! JPEG has no alpha channel. When a transparent PNG, GIF or WebP is shrunk
//! to JPEG, its transparent pixels would otherwise come out as whatever RGB
//! values the encoder happens to keep (usually black). With a background
//! color configured, the canvas is pre-filled with it and the scaled source
//! is alpha-composited on top.

use super::detect::RasterFormat;
use super::params::{ResizePlan, Rgb};
use image::{DynamicImage, Rgba, RgbImage, RgbaImage};

/// Target raster of one shrink, before the scaled source is drawn on it.
///
/// Consumed by [`Canvas::composite`], so each canvas receives exactly one
/// layer.
#[derive(Debug)]
pub enum Canvas {
    /// No fill: the layer replaces it wholesale.
    Blank { width: u32, height: u32 },
    /// Pre-filled with the background color.
    Filled(RgbaImage),
}

/// Allocate the canvas for `plan`, filled with `background` when the source
/// format can be transparent.
///
/// A blank canvas is not allocated: the resampled source always covers the
/// full target area, so it simply becomes the canvas.
pub fn prepare_canvas(plan: ResizePlan, format: RasterFormat, background: Option<Rgb>) -> Canvas {
    match background {
        Some(color) if format.supports_transparency() => {
            let [r, g, b] = color.channels();
            Canvas::Filled(RgbaImage::from_pixel(
                plan.width,
                plan.height,
                Rgba([r, g, b, 255]),
            ))
        }
        _ => Canvas::Blank {
            width: plan.width,
            height: plan.height,
        },
    }
}

impl Canvas {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Canvas::Blank { width, height } => (*width, *height),
            Canvas::Filled(pixels) => pixels.dimensions(),
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Canvas::Filled(_))
    }

    /// Draw `layer` over the whole canvas and flatten to opaque RGB for the
    /// JPEG encoder. `layer` must match the canvas size.
    ///
    /// On a blank canvas any alpha in `layer` is dropped and its stored
    /// color channels remain.
    pub fn composite(self, layer: DynamicImage) -> RgbImage {
        match self {
            Canvas::Blank { .. } => layer.into_rgb8(),
            Canvas::Filled(mut background) => {
                image::imageops::overlay(&mut background, &layer.into_rgba8(), 0, 0);
                DynamicImage::ImageRgba8(background).into_rgb8()
            }
        }
    }
}
