//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what to produce) and the [`backend`](super::backend)
//! (which does the actual pixel work).
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (0–100, default 85). Clamped on construction.
//! - [`Rgb`]: Solid background color used to replace transparency, parsed from `#RRGGBB`.
//! - [`Dimensions`]: Width and height of a source image.
//! - [`ResizePlan`]: Target dimensions computed by the planner.
//! - [`ShrinkParams`]: Everything a shrink needs: source, output, box constraints, quality.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Quality setting for lossy image encoding (0-100).
///
/// The JPEG backend further raises 0 to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub const DEFAULT: Quality = Quality(85);

    pub fn new(value: u32) -> Self {
        Self(value.min(100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid color `{0}`, color must be provided in the #RRGGBB format")]
pub struct ColorParseError(pub String);

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    pub fn channels(self) -> [u8; 3] {
        self.0
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    /// Parse `#RRGGBB` (the leading `#` is optional, surrounding whitespace is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorParseError(s.to_string()))
        };
        Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Target dimensions for a shrink, as decided by
/// [`plan_resize`](super::calculations::plan_resize).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ResizePlan {
    pub width: u32,
    pub height: u32,
}

impl ResizePlan {
    /// True when the plan keeps the original size, i.e. only re-encoding is needed.
    pub fn is_identity(self, original: Dimensions) -> bool {
        self.width == original.width && self.height == original.height
    }
}

impl fmt::Display for ResizePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parameters for a shrink operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShrinkParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub quality: Quality,
}

impl ShrinkParams {
    /// Re-encode only: no box constraint, default quality.
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            max_width: None,
            max_height: None,
            quality: Quality::default(),
        }
    }

    pub fn max_width(mut self, width: impl Into<Option<u32>>) -> Self {
        self.max_width = width.into();
        self
    }

    pub fn max_height(mut self, height: impl Into<Option<u32>>) -> Self {
        self.max_height = height.into();
        self
    }

    pub fn quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }
}
