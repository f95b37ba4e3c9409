//! High-level image operations.
//!
//! [`shrink`] combines detection, planning, decoding, compositing and
//! encoding into one call:
//!
//! ```text
//! probe → plan_resize → decode → prepare_canvas → resample → encode JPEG
//! ```
//!
//! Outcomes are split by who is at fault. A source that simply is not a
//! readable image yields `Ok(false)`, so callers looping over user uploads
//! can skip it. A recognized container we refuse to decode, or a resampler
//! failure, is a [`ShrinkError`]: the caller asked for something this crate
//! never does, or the machine ran out of resources.

use super::backend::ImageBackend;
use super::calculations::plan_resize;
use super::canvas::{Canvas, prepare_canvas};
use super::detect::{Container, Probe, SourceInfo, probe};
use super::params::{ResizePlan, Rgb, ShrinkParams};
use crate::publish::write_atomically;
use image::{DynamicImage, RgbImage};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ShrinkError {
    #[error("Provided image {} has an unsupported format ({container})", path.display())]
    UnsupportedFormat { path: PathBuf, container: Container },
    #[error("Couldn't resize {} to {width}x{height}: {reason}", path.display())]
    ResampleFailed {
        path: PathBuf,
        width: u32,
        height: u32,
        reason: String,
    },
}

/// Resample `raster` to the plan and draw it onto `canvas`, yielding the
/// opaque pixels handed to the JPEG encoder.
///
/// When the plan keeps the original size the decoded raster is used as is.
fn resample(
    backend: &impl ImageBackend,
    canvas: Canvas,
    raster: DynamicImage,
    source: &SourceInfo,
    plan: ResizePlan,
) -> Result<RgbImage, ShrinkError> {
    let failed = |reason: String| ShrinkError::ResampleFailed {
        path: source.path.clone(),
        width: plan.width,
        height: plan.height,
        reason,
    };

    let layer = if plan.is_identity(source.dimensions) {
        debug!(source = %source.path.display(), "target equals original, skipping resample");
        raster
    } else {
        backend
            .resample(&raster, plan.width, plan.height)
            .map_err(|e| failed(e.to_string()))?
    };

    if (layer.width(), layer.height()) != canvas.dimensions() {
        return Err(failed(format!(
            "layer is {}x{}, canvas is {plan}",
            layer.width(),
            layer.height()
        )));
    }
    Ok(canvas.composite(layer))
}

/// Shrink `params.source` to fit the box and write it to `params.output` as JPEG.
///
/// Images already inside the box (or with no box given) are only re-encoded.
/// When `background` is set, transparent areas of PNG, GIF and WebP sources
/// are painted with it.
///
/// Returns `Ok(true)` once the output holds a complete JPEG, `Ok(false)` when
/// the source is unreadable or the output could not be written (the output
/// is then left untouched).
pub fn shrink(
    backend: &impl ImageBackend,
    background: Option<Rgb>,
    params: &ShrinkParams,
) -> Result<bool, ShrinkError> {
    let source = match probe(&params.source) {
        Ok(Probe::Supported(info)) => info,
        Ok(Probe::Unsupported(container)) => {
            return Err(ShrinkError::UnsupportedFormat {
                path: params.source.clone(),
                container,
            });
        }
        Err(e) => {
            warn!(source = %params.source.display(), error = %e, "source is not a readable image");
            return Ok(false);
        }
    };

    let plan = plan_resize(source.dimensions, params.max_width, params.max_height);
    debug!(
        source = %source.path.display(),
        format = %source.format,
        original = %source.dimensions,
        target = %plan,
        "planned shrink"
    );

    let raster = match backend.decode(&source.path, source.format) {
        Ok(raster) => raster,
        Err(e) => {
            warn!(source = %source.path.display(), error = %e, "decode failed");
            return Ok(false);
        }
    };

    let canvas = prepare_canvas(plan, source.format, background);
    if canvas.is_filled() {
        debug!(source = %source.path.display(), "replacing transparency with background");
    }
    let rgb = resample(backend, canvas, raster, &source, plan)?;

    let written = write_atomically(&params.output, ".jpg", |out| {
        backend.encode_jpeg(&rgb, out, params.quality)
    });
    match written {
        Ok(()) => {
            debug!(output = %params.output.display(), quality = %params.quality, "wrote JPEG");
            Ok(true)
        }
        Err(e) => {
            warn!(output = %params.output.display(), error = %e, "could not write output");
            Ok(false)
        }
    }
}
