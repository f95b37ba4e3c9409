//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. Diagnostics go to stderr
//! through `tracing`, never through this module.
//!
//! # Output Format
//!
//! ## Probe
//!
//! ```text
//! photo.png
//!     Format: PNG
//!     Size: 1000x500
//! ```
//!
//! ## Plan
//!
//! ```text
//! 1000x500 → 100x50
//! ```
//!
//! ## Shrink / WebP
//!
//! ```text
//! photo.png → thumb.jpg (100x50)
//! notes.txt: skipped (not a readable image)
//! ```

use crate::imaging::{Dimensions, Probe, ResizePlan};
use serde::Serialize;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// probe
// ============================================================================

/// Machine-readable probe result, printed by `probe --json`.
#[derive(Debug, Serialize)]
pub struct ProbeReport<'a> {
    pub path: &'a Path,
    pub format: &'static str,
    pub supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl<'a> ProbeReport<'a> {
    pub fn new(path: &'a Path, probe: &Probe) -> Self {
        match probe {
            Probe::Supported(info) => Self {
                path,
                format: info.format.container().name(),
                supported: true,
                width: Some(info.dimensions.width),
                height: Some(info.dimensions.height),
            },
            Probe::Unsupported(container) => Self {
                path,
                format: container.name(),
                supported: false,
                width: None,
                height: None,
            },
        }
    }
}

pub fn format_probe(path: &Path, probe: &Probe) -> Vec<String> {
    let mut lines = vec![path.display().to_string()];
    match probe {
        Probe::Supported(info) => {
            lines.push(format!("{}Format: {}", indent(1), info.format));
            lines.push(format!("{}Size: {}", indent(1), info.dimensions));
        }
        Probe::Unsupported(container) => {
            lines.push(format!("{}Format: {} (unsupported)", indent(1), container));
        }
    }
    lines
}

pub fn format_probe_json(path: &Path, probe: &Probe) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ProbeReport::new(path, probe))
}

pub fn print_probe(path: &Path, probe: &Probe) {
    for line in format_probe(path, probe) {
        println!("{}", line);
    }
}

// ============================================================================
// plan
// ============================================================================

pub fn format_plan(original: Dimensions, plan: ResizePlan) -> String {
    if plan.is_identity(original) {
        format!("{original} (unchanged)")
    } else {
        format!("{original} → {plan}")
    }
}

// ============================================================================
// shrink / webp
// ============================================================================

/// One line per conversion: `source → destination (WxH)` or `source: skipped`.
///
/// `outcome` carries the dimensions read back from the destination, when known.
pub fn format_conversion(
    source: &Path,
    destination: &Path,
    outcome: Result<Option<Dimensions>, &str>,
) -> String {
    match outcome {
        Ok(Some(size)) => format!(
            "{} → {} ({size})",
            source.display(),
            destination.display()
        ),
        Ok(None) => format!("{} → {}", source.display(), destination.display()),
        Err(reason) => format!("{}: skipped ({reason})", source.display()),
    }
}

pub fn print_conversion(
    source: &Path,
    destination: &Path,
    outcome: Result<Option<Dimensions>, &str>,
) {
    println!("{}", format_conversion(source, destination, outcome));
}
