//! Configuration module.
//!
//! Handles loading and validating `imgfit.toml`. Stock defaults are the base
//! layer; a user file only needs the keys it wants to override.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! transparency_replacement = "#FFFFFF"  # Background for transparent sources ("" = keep codec default)
//!
//! [shrink]
//! quality = 85              # JPEG quality (0-100)
//! # max_width = 1920        # Default box when the CLI gives none
//! # max_height = 1080
//!
//! [webp]
//! quality = 85              # WebP quality (0-100)
//! cwebp = "cwebp"           # Encoder binary, looked up on PATH unless it is a path
//! # method = 4              # cwebp -m effort (0-6)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{ColorParseError, Quality, Rgb};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Invalid configuration: {0}")]
    InvalidColor(#[from] ColorParseError),
}

/// Configuration loaded from `imgfit.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImgfitConfig {
    /// `#RRGGBB` painted under transparent pixels when shrinking PNG, GIF or
    /// WebP sources. Empty disables replacement.
    pub transparency_replacement: String,
    pub shrink: ShrinkConfig,
    pub webp: WebpConfig,
}

impl Default for ImgfitConfig {
    fn default() -> Self {
        Self {
            transparency_replacement: "#FFFFFF".to_string(),
            shrink: ShrinkConfig::default(),
            webp: WebpConfig::default(),
        }
    }
}

impl ImgfitConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shrink.quality > 100 {
            return Err(ConfigError::Validation(
                "shrink.quality must be 0-100".into(),
            ));
        }
        if self.shrink.max_width == Some(0) || self.shrink.max_height == Some(0) {
            return Err(ConfigError::Validation(
                "shrink.max_width and shrink.max_height must be positive".into(),
            ));
        }
        if self.webp.quality > 100 {
            return Err(ConfigError::Validation("webp.quality must be 0-100".into()));
        }
        if self.webp.method.is_some_and(|m| m > 6) {
            return Err(ConfigError::Validation("webp.method must be 0-6".into()));
        }
        if self.webp.cwebp.trim().is_empty() {
            return Err(ConfigError::Validation("webp.cwebp must not be empty".into()));
        }
        self.transparency_color()?;
        Ok(())
    }

    /// The parsed replacement color, or `None` when replacement is disabled.
    pub fn transparency_color(&self) -> Result<Option<Rgb>, ColorParseError> {
        if self.transparency_replacement.trim().is_empty() {
            return Ok(None);
        }
        self.transparency_replacement.parse().map(Some)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShrinkConfig {
    pub quality: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self {
            quality: Quality::DEFAULT.value().into(),
            max_width: None,
            max_height: None,
        }
    }
}

impl ShrinkConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebpConfig {
    pub quality: u32,
    /// Encoder binary name or path.
    pub cwebp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<u8>,
}

impl Default for WebpConfig {
    fn default() -> Self {
        Self {
            quality: Quality::DEFAULT.value().into(),
            cwebp: "cwebp".to_string(),
            method: None,
        }
    }
}

impl WebpConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ImgfitConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse config text, merge it over stock defaults and validate.
pub fn parse_config(content: &str) -> Result<ImgfitConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let config: ImgfitConfig = merge_toml(stock_defaults_value()?, overlay).try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`.
///
/// A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<ImgfitConfig, ConfigError> {
    if !path.exists() {
        return Ok(ImgfitConfig::default());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock `imgfit.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imgfit configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Solid color painted under transparent pixels when a PNG, GIF or WebP
# source is shrunk to JPEG. Format: #RRGGBB. Set to "" to disable, in which
# case transparent areas come out however the codec leaves them.
transparency_replacement = "#FFFFFF"

# ---------------------------------------------------------------------------
# Shrink (any supported format -> JPEG)
# ---------------------------------------------------------------------------
[shrink]
# JPEG encoding quality (0 = worst, 100 = best).
quality = 85

# Bounding box used when the command line gives none. Images are never
# upscaled; omit both to only re-encode.
# max_width = 1920
# max_height = 1080

# ---------------------------------------------------------------------------
# WebP (delegated to the cwebp encoder)
# ---------------------------------------------------------------------------
[webp]
# WebP encoding quality (0 = worst, 100 = best).
quality = 85

# Encoder binary. A bare name is looked up on PATH.
cwebp = "cwebp"

# Compression effort passed as cwebp -m (0 = fastest, 6 = smallest).
# method = 4
"##
}
