//! WebP renditions through an external encoder.
//!
//! Pixel work for WebP is delegated to the `cwebp` command-line tool rather
//! than done in-process. The dimensions of the source are kept; only the
//! container changes.
//!
//! The encoder always writes to a `.webp`-suffixed staging file next to the
//! destination (cwebp infers nothing from the name, but other converters do),
//! and the staging file is renamed over the destination once the encoder
//! succeeds. The destination never holds a partial file.
//!
//! | Outcome | [`try_to_webp`] | [`to_webp`] |
//! |---|---|---|
//! | converted | `Ok(())` | `true` |
//! | GIF or other unsupported input | [`WebpError::ConversionUnsupported`] | `false` |
//! | staging file could not be created | [`WebpError::TempFile`] | `false` |
//! | encoder missing or failed | [`WebpError::EncoderNotFound`] / [`WebpError::Failed`] | `false` |

use crate::imaging::{Container, Quality, sniff_file};
use crate::publish::{publish, staging_file};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum WebpError {
    #[error("{} cannot be converted to WebP ({container})", path.display())]
    ConversionUnsupported { path: PathBuf, container: Container },
    #[error("WebP encoder `{binary}` not found: {reason}")]
    EncoderNotFound { binary: String, reason: String },
    #[error("Couldn't create a temporary .webp file: {0}")]
    TempFile(#[source] io::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("WebP encoder failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },
}

/// Something that turns an image file into a WebP file.
///
/// `destination` is always a fresh `.webp` path the converter may overwrite.
pub trait WebpConverter: Sync {
    fn convert(&self, source: &Path, destination: &Path, quality: Quality)
    -> Result<(), WebpError>;
}

/// Converter backed by the `cwebp` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CwebpConverter {
    binary: String,
    method: Option<u8>,
}

impl CwebpConverter {
    pub const DEFAULT_BINARY: &'static str = "cwebp";

    /// `binary` is a program name looked up on `PATH`, or a path to the executable.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            method: None,
        }
    }

    /// Compression effort passed as `-m` (0 fast .. 6 slowest). Values above 6 clamp.
    pub fn with_method(mut self, method: Option<u8>) -> Self {
        self.method = method.map(|m| m.min(6));
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// cwebp reads JPEG, PNG, TIFF and WebP. It has no GIF reader (gif2webp is a
    /// separate tool), so GIF and every other container is refused up front.
    fn accepts(container: Container) -> bool {
        matches!(
            container,
            Container::Jpeg | Container::Png | Container::WebP | Container::Tiff
        )
    }
}

impl Default for CwebpConverter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BINARY)
    }
}

impl WebpConverter for CwebpConverter {
    fn convert(
        &self,
        source: &Path,
        destination: &Path,
        quality: Quality,
    ) -> Result<(), WebpError> {
        // Unrecognized bytes are left for cwebp to reject
        if let Some(container) = sniff_file(source)?
            && !Self::accepts(container)
        {
            return Err(WebpError::ConversionUnsupported {
                path: source.to_path_buf(),
                container,
            });
        }

        let binary = which::which(&self.binary).map_err(|e| WebpError::EncoderNotFound {
            binary: self.binary.clone(),
            reason: e.to_string(),
        })?;

        let mut command = Command::new(&binary);
        command
            .arg("-quiet")
            .arg("-q")
            .arg(quality.value().to_string());
        if let Some(method) = self.method {
            command.arg("-m").arg(method.to_string());
        }
        command.arg(source).arg("-o").arg(destination);

        debug!(
            encoder = %binary.display(),
            source = %source.display(),
            %quality,
            "running WebP encoder"
        );
        let output = command.output()?;
        if !output.status.success() {
            return Err(WebpError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Convert `source` to WebP at `destination`, reporting why it failed.
pub fn try_to_webp(
    converter: &impl WebpConverter,
    source: &Path,
    destination: &Path,
    quality: Quality,
) -> Result<(), WebpError> {
    let staged = staging_file(destination, ".webp").map_err(WebpError::TempFile)?;
    converter.convert(source, staged.path(), quality)?;
    publish(staged, destination)?;
    debug!(destination = %destination.display(), "wrote WebP");
    Ok(())
}

/// Convert `source` to WebP at `destination`.
///
/// Returns `false` on any failure, leaving the destination untouched.
pub fn to_webp(
    converter: &impl WebpConverter,
    source: &Path,
    destination: &Path,
    quality: Quality,
) -> bool {
    match try_to_webp(converter, source, destination, quality) {
        Ok(()) => true,
        Err(e @ WebpError::ConversionUnsupported { .. }) => {
            debug!(error = %e, "skipping WebP conversion");
            false
        }
        Err(e) => {
            warn!(source = %source.display(), error = %e, "WebP conversion failed");
            false
        }
    }
}
