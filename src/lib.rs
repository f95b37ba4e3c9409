//! # imgfit
//!
//! Prepares uploaded images for the web: shrinks them to fit a bounding box,
//! replaces transparency with a solid background, re-encodes them as JPEG,
//! and produces WebP renditions through the `cwebp` encoder.
//!
//! # Pipeline
//!
//! ```text
//! shrink:  probe → plan_resize → decode → prepare_canvas → resample → JPEG → publish
//! webp:    sniff → cwebp (into a staging file) → publish
//! ```
//!
//! Every output is written to a staging file beside the destination and
//! renamed over it only once complete, so a failed run never leaves a
//! truncated file behind.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Detection, dimension planning, compositing, resampling, JPEG encoding |
//! | [`webp`] | WebP delegate: [`webp::WebpConverter`] trait and the `cwebp` implementation |
//! | [`service`] | [`service::Imaging`], one value bundling the policy, backend and converter |
//! | [`config`] | `imgfit.toml` loading and validation |
//! | [`publish`] | Staging files and atomic replacement of destinations |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Failure Is Usually `false`
//!
//! The operations are meant to sit behind an upload form. A file that turns
//! out not to be an image, or a destination that can't be written, is an
//! ordinary outcome and reported as `false`. Errors are reserved for requests
//! the crate can never satisfy (a TIFF passed to `shrink`) and for resampler
//! failures. [`webp::try_to_webp`] exposes the classified error when the
//! reason matters.
//!
//! ## Never Upscale
//!
//! [`imaging::plan_resize`] only ever shrinks. An image already inside the
//! box is re-encoded at its original size.
//!
//! ## External WebP Encoder
//!
//! WebP output is produced by `cwebp`, found with [`which`]. The encoder is an
//! injected trait, so tests run without the binary.

pub mod config;
pub mod imaging;
pub mod output;
pub mod publish;
pub mod service;
pub mod webp;

#[cfg(test)]
pub(crate) mod test_helpers;
