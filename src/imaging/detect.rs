//! Format detection from signature bytes.
//!
//! The extension of a file is never consulted: a `.jpg` that actually holds
//! PNG data is treated as PNG, and a `.png` holding text is unreadable.
//!
//! Detection distinguishes three outcomes, because callers treat them
//! differently:
//!
//! | Outcome | Meaning | [`shrink`](super::operations::shrink) result |
//! |---|---|---|
//! | [`Probe::Supported`] | JPEG, PNG, GIF or WebP with a readable header | proceeds |
//! | [`Probe::Unsupported`] | a known image container we do not decode (TIFF, BMP, …) | hard error |
//! | [`ProbeError`] | missing file, I/O failure, unknown bytes, corrupt header | `false` |

use super::params::Dimensions;
use image::ImageReader;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bytes read from the start of a file for signature sniffing.
const HEADER_LEN: u64 = 32;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Not a recognized image: {}", .0.display())]
    Unrecognized(PathBuf),
    #[error("Failed to read dimensions of {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}

/// Image container recognized from its signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Jpeg,
    Png,
    Gif,
    WebP,
    Tiff,
    Bmp,
    Ico,
    Psd,
    Avif,
    Heif,
    Jxl,
}

impl Container {
    pub fn name(self) -> &'static str {
        match self {
            Container::Jpeg => "JPEG",
            Container::Png => "PNG",
            Container::Gif => "GIF",
            Container::WebP => "WEBP",
            Container::Tiff => "TIFF",
            Container::Bmp => "BMP",
            Container::Ico => "ICO",
            Container::Psd => "PSD",
            Container::Avif => "AVIF",
            Container::Heif => "HEIF",
            Container::Jxl => "JPEG XL",
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The containers this crate can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl RasterFormat {
    /// Whether the container can carry transparent pixels.
    pub fn supports_transparency(self) -> bool {
        match self {
            RasterFormat::Gif | RasterFormat::Png | RasterFormat::WebP => true,
            RasterFormat::Jpeg => false,
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            RasterFormat::Jpeg => image::ImageFormat::Jpeg,
            RasterFormat::Png => image::ImageFormat::Png,
            RasterFormat::Gif => image::ImageFormat::Gif,
            RasterFormat::WebP => image::ImageFormat::WebP,
        }
    }

    pub fn container(self) -> Container {
        match self {
            RasterFormat::Jpeg => Container::Jpeg,
            RasterFormat::Png => Container::Png,
            RasterFormat::Gif => Container::Gif,
            RasterFormat::WebP => Container::WebP,
        }
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.container().fmt(f)
    }
}

impl TryFrom<Container> for RasterFormat {
    /// The container is handed back when it has no decoder.
    type Error = Container;

    fn try_from(container: Container) -> Result<Self, Self::Error> {
        match container {
            Container::Jpeg => Ok(RasterFormat::Jpeg),
            Container::Png => Ok(RasterFormat::Png),
            Container::Gif => Ok(RasterFormat::Gif),
            Container::WebP => Ok(RasterFormat::WebP),
            other => Err(other),
        }
    }
}

/// A decodable source image, probed once per operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub format: RasterFormat,
    pub dimensions: Dimensions,
}

/// Result of probing a readable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Supported(SourceInfo),
    Unsupported(Container),
}

/// Classify the container from its leading bytes.
pub fn sniff(data: &[u8]) -> Option<Container> {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(Container::Jpeg);
    }
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some(Container::Png);
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some(Container::Gif);
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some(Container::WebP);
    }
    if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
        return Some(Container::Tiff);
    }
    if is_bmp(data) {
        return Some(Container::Bmp);
    }
    if is_ico(data) {
        return Some(Container::Ico);
    }
    if data.starts_with(b"8BPS") && matches!(data.get(4..6), Some([0, 1] | [0, 2])) {
        return Some(Container::Psd);
    }
    // Only the boxed form: a bare `FF 0A` codestream is too short a signature
    if data.starts_with(&[
        0x00, 0x00, 0x00, 0x0C, b'J', b'X', b'L', b' ', 0x0D, 0x0A, 0x87, 0x0A,
    ]) {
        return Some(Container::Jxl);
    }
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        return match &data[8..12] {
            b"avif" | b"avis" => Some(Container::Avif),
            b"heic" | b"heix" | b"hevc" | b"mif1" | b"msf1" => Some(Container::Heif),
            _ => None,
        };
    }
    None
}

fn le_u16(data: &[u8], offset: usize) -> Option<u16> {
    Some(u16::from_le_bytes(data.get(offset..offset + 2)?.try_into().ok()?))
}

fn le_i32(data: &[u8], offset: usize) -> Option<i32> {
    Some(i32::from_le_bytes(data.get(offset..offset + 4)?.try_into().ok()?))
}

/// `BM` followed by a DIB header of a known size and a non-empty raster.
///
/// Two bytes alone match plenty of text files, so the header fields that
/// follow must be plausible too.
fn is_bmp(data: &[u8]) -> bool {
    if !data.starts_with(b"BM") {
        return false;
    }
    match le_i32(data, 14) {
        // OS/2 core header: unsigned 16-bit dimensions
        Some(12) => {
            le_u16(data, 18).is_some_and(|w| w > 0) && le_u16(data, 20).is_some_and(|h| h > 0)
        }
        // Negative height means top-down rows
        Some(40 | 52 | 56 | 64 | 108 | 124) => {
            le_i32(data, 18).is_some_and(|w| w > 0) && le_i32(data, 22).is_some_and(|h| h != 0)
        }
        _ => false,
    }
}

/// Icon directory: reserved zero, type 1, at least one entry, and a first
/// entry with a zero reserved byte and at most one color plane.
fn is_ico(data: &[u8]) -> bool {
    data.starts_with(&[0x00, 0x00, 0x01, 0x00])
        && le_u16(data, 4).is_some_and(|count| count > 0)
        && data.get(9) == Some(&0)
        && le_u16(data, 10).is_some_and(|planes| planes <= 1)
}

fn read_header(file: &mut File) -> io::Result<Vec<u8>> {
    let mut header = Vec::with_capacity(HEADER_LEN as usize);
    file.by_ref().take(HEADER_LEN).read_to_end(&mut header)?;
    Ok(header)
}

/// Sniff the container of a file without reading its dimensions.
pub fn sniff_file(path: &Path) -> io::Result<Option<Container>> {
    let mut file = File::open(path)?;
    Ok(sniff(&read_header(&mut file)?))
}

/// Probe a file: container from its signature, dimensions from its header.
///
/// No pixel data is decoded. Unsupported containers are reported without
/// dimensions since their headers are never parsed.
pub fn probe(path: &Path) -> Result<Probe, ProbeError> {
    let mut file = File::open(path)?;
    let header = read_header(&mut file)?;
    let container = sniff(&header).ok_or_else(|| ProbeError::Unrecognized(path.to_path_buf()))?;

    let format = match RasterFormat::try_from(container) {
        Ok(format) => format,
        Err(unsupported) => return Ok(Probe::Unsupported(unsupported)),
    };

    file.seek(SeekFrom::Start(0))?;
    let corrupt = |reason: String| ProbeError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };
    let (width, height) = ImageReader::with_format(BufReader::new(file), format.image_format())
        .into_dimensions()
        .map_err(|e| corrupt(e.to_string()))?;
    if width == 0 || height == 0 {
        return Err(corrupt(format!("empty image ({width}x{height})")));
    }

    Ok(Probe::Supported(SourceInfo {
        path: path.to_path_buf(),
        format,
        dimensions: Dimensions { width, height },
    }))
}

/// Cheap yes/no check: is this a file we can shrink?
///
/// Two independent sniffers must agree: the content-derived media type must
/// be `image/*`, and the signature must be one of the decodable containers.
/// No dimensions are read and errors are folded into `false`.
pub fn supports(path: &Path) -> bool {
    let header = match File::open(path).and_then(|mut file| read_header(&mut file)) {
        Ok(header) => header,
        Err(_) => return false,
    };

    let media_type_is_image = image::guess_format(&header)
        .is_ok_and(|format| format.to_mime_type().starts_with("image/"));

    media_type_is_image
        && sniff(&header).is_some_and(|container| RasterFormat::try_from(container).is_ok())
}
