//! The imaging service: one value holding the transparency policy, the pixel
//! backend and the WebP converter, exposing every operation of the crate.
//!
//! ```no_run
//! use imgfit::imaging::{Quality, Rgb, ShrinkParams};
//! use imgfit::service::Imaging;
//! use std::path::Path;
//!
//! let imaging = Imaging::new().with_transparency("#FFFFFF".parse::<Rgb>()?);
//! let params = ShrinkParams::new("upload.png", "thumb.jpg").max_width(320);
//! if imaging.shrink(&params)? {
//!     imaging.to_webp(Path::new("upload.png"), Path::new("upload.webp"), Quality::default());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The service holds only immutable state, so a single instance can be shared
//! between threads.

use crate::config::ImgfitConfig;
use crate::imaging::{
    ImageBackend, Probe, ProbeError, Quality, Rgb, RustBackend, ShrinkError, ShrinkParams,
};
use crate::webp::{CwebpConverter, WebpConverter, WebpError};
use crate::{config, imaging, webp};
use std::path::Path;

pub struct Imaging<B = RustBackend, C = CwebpConverter> {
    transparency: Option<Rgb>,
    backend: B,
    converter: C,
}

impl Imaging {
    /// Pure Rust backend, `cwebp` from `PATH`, no transparency replacement.
    pub fn new() -> Self {
        Self::with_parts(None, RustBackend::new(), CwebpConverter::default())
    }

    /// Build from a loaded configuration.
    pub fn from_config(config: &ImgfitConfig) -> Result<Self, config::ConfigError> {
        let transparency = config.transparency_color()?;
        let converter =
            CwebpConverter::new(config.webp.cwebp.clone()).with_method(config.webp.method);
        Ok(Self::with_parts(transparency, RustBackend::new(), converter))
    }
}

impl Default for Imaging {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ImageBackend, C: WebpConverter> Imaging<B, C> {
    pub fn with_parts(transparency: Option<Rgb>, backend: B, converter: C) -> Self {
        Self {
            transparency,
            backend,
            converter,
        }
    }

    pub fn with_transparency(mut self, color: impl Into<Option<Rgb>>) -> Self {
        self.transparency = color.into();
        self
    }

    pub fn transparency(&self) -> Option<Rgb> {
        self.transparency
    }

    pub fn probe(&self, source: &Path) -> Result<Probe, ProbeError> {
        imaging::probe(source)
    }

    pub fn supports(&self, source: &Path) -> bool {
        imaging::supports(source)
    }

    /// See [`imaging::shrink`].
    pub fn shrink(&self, params: &ShrinkParams) -> Result<bool, ShrinkError> {
        imaging::shrink(&self.backend, self.transparency, params)
    }

    /// See [`webp::to_webp`].
    pub fn to_webp(&self, source: &Path, destination: &Path, quality: Quality) -> bool {
        webp::to_webp(&self.converter, source, destination, quality)
    }

    /// See [`webp::try_to_webp`].
    pub fn try_to_webp(
        &self,
        source: &Path,
        destination: &Path,
        quality: Quality,
    ) -> Result<(), WebpError> {
        webp::try_to_webp(&self.converter, source, destination, quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RasterFormat;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::*;
    use crate::webp::tests::{Behavior, FakeConverter};
    use tempfile::TempDir;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn service_is_shareable_between_threads() {
        assert_send_sync::<Imaging>();
    }

    #[test]
    fn from_config_reads_policy_and_encoder() {
        let config = config::parse_config(
            "transparency_replacement = \"#000000\"\n[webp]\ncwebp = \"/opt/cwebp\"\n",
        )
        .unwrap();
        let imaging = Imaging::from_config(&config).unwrap();
        assert_eq!(imaging.transparency(), Some(Rgb([0, 0, 0])));
        assert_eq!(imaging.converter.binary(), "/opt/cwebp");
    }

    #[test]
    fn from_config_without_replacement() {
        let config = config::parse_config("transparency_replacement = \"\"\n").unwrap();
        assert_eq!(Imaging::from_config(&config).unwrap().transparency(), None);
    }

    #[test]
    fn new_has_no_transparency_policy() {
        assert_eq!(Imaging::new().transparency(), None);
        assert_eq!(
            Imaging::new().with_transparency(Rgb::WHITE).transparency(),
            Some(Rgb::WHITE)
        );
    }

    #[test]
    fn shrink_goes_through_the_backend() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a.png");
        write_image(&src, RasterFormat::Png, 20, 10);
        let imaging = Imaging::with_parts(
            Some(Rgb::WHITE),
            MockBackend::decoding(20, 10),
            FakeConverter::new(Behavior::Copy),
        );

        let params = ShrinkParams::new(&src, tmp.path().join("a.jpg")).max_height(5);
        assert!(imaging.shrink(&params).unwrap());
        assert!(
            imaging
                .backend
                .get_operations()
                .contains(&RecordedOp::Resample {
                    width: 10,
                    height: 5
                })
        );
    }

    #[test]
    fn webp_goes_through_the_converter() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a.png");
        write_image(&src, RasterFormat::Png, 20, 10);
        let imaging = Imaging::with_parts(
            None,
            MockBackend::decoding(20, 10),
            FakeConverter::new(Behavior::Unsupported),
        );

        let dest = tmp.path().join("a.webp");
        assert!(!imaging.to_webp(&src, &dest, Quality::new(50)));
        assert!(matches!(
            imaging.try_to_webp(&src, &dest, Quality::new(50)),
            Err(WebpError::ConversionUnsupported { .. })
        ));
        assert_eq!(imaging.converter.get_calls().len(), 2);
        assert!(!dest.exists());
    }

    #[test]
    fn probe_and_supports_delegate_to_detection() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a.gif");
        write_image(&src, RasterFormat::Gif, 3, 4);
        let imaging = Imaging::new();
        assert!(imaging.supports(&src));
        assert!(matches!(imaging.probe(&src).unwrap(), Probe::Supported(_)));
    }
}
