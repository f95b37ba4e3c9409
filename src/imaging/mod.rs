//! Image processing: detection, planning, compositing and JPEG encoding.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Detect** | signature sniffing + `image::ImageReader::into_dimensions` |
//! | **Plan** | integer proportional fit, width first then height |
//! | **Decode** | `image::ImageReader::with_format` (JPEG, PNG, GIF, WebP) |
//! | **Composite** | `image::imageops::overlay` onto a pre-filled canvas |
//! | **Resample** | `resize_exact` with the `Triangle` filter |
//! | **Encode → JPEG** | `image::codecs::jpeg::JpegEncoder` |
//!
//! The module is split into:
//! - **Detect**: Signature sniffing and header probing, no pixel decode
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Canvas**: Transparency replacement policy
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`shrink`], combining all of the above

pub mod backend;
mod calculations;
mod canvas;
mod detect;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::plan_resize;
pub use canvas::{Canvas, prepare_canvas};
pub use detect::{
    Container, Probe, ProbeError, RasterFormat, SourceInfo, probe, sniff, sniff_file,
    supports,
};
pub use operations::{ShrinkError, shrink};
pub use params::{ColorParseError, Dimensions, Quality, ResizePlan, Rgb, ShrinkParams};
pub use rust_backend::RustBackend;
