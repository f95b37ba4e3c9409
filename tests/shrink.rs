//! End-to-end shrink tests through the public API.
//!
//! Fixtures are generated into a temp directory with the `image` encoders,
//! then shrunk with the real backend and read back.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imgfit::imaging::{Probe, RasterFormat, Rgb, ShrinkError, ShrinkParams, probe};
use imgfit::service::Imaging;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_fixture(dir: &Path, name: &str, format: ImageFormat, w: u32, h: u32) -> PathBuf {
    let path = dir.join(name);
    let img = RgbaImage::from_fn(w, h, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255]));
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
        _ => DynamicImage::ImageRgba8(img),
    };
    img.save_with_format(&path, format).unwrap();
    path
}

fn output_size(path: &Path) -> (RasterFormat, u32, u32) {
    match probe(path).unwrap() {
        Probe::Supported(info) => (
            info.format,
            info.dimensions.width,
            info.dimensions.height,
        ),
        Probe::Unsupported(c) => panic!("output is {c}"),
    }
}

fn shrink_to(
    imaging: &Imaging,
    source: &Path,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> (bool, PathBuf) {
    let dest = source.with_file_name("out.jpg");
    let params = ShrinkParams::new(source, &dest)
        .max_width(max_width)
        .max_height(max_height);
    (imaging.shrink(&params).unwrap(), dest)
}

#[test]
fn wide_image_fits_max_width() {
    let tmp = TempDir::new().unwrap();
    let src = write_fixture(tmp.path(), "wide.png", ImageFormat::Png, 1000, 500);

    let (ok, dest) = shrink_to(&Imaging::new(), &src, Some(100), None);
    assert!(ok);
    assert_eq!(output_size(&dest), (RasterFormat::Jpeg, 100, 50));
}

#[test]
fn tall_image_at_exact_max_height_is_unchanged() {
    let tmp = TempDir::new().unwrap();
    let src = write_fixture(tmp.path(), "tall.jpg", ImageFormat::Jpeg, 500, 1000);

    let (ok, dest) = shrink_to(&Imaging::new(), &src, None, Some(1000));
    assert!(ok);
    assert_eq!(output_size(&dest), (RasterFormat::Jpeg, 500, 1000));
}

#[test]
fn small_image_is_never_upscaled() {
    let tmp = TempDir::new().unwrap();
    let src = write_fixture(tmp.path(), "wide.webp", ImageFormat::WebP, 2000, 1000);

    let (ok, dest) = shrink_to(&Imaging::new(), &src, Some(3000), Some(3000));
    assert!(ok);
    assert_eq!(output_size(&dest), (RasterFormat::Jpeg, 2000, 1000));
}

#[test]
fn height_constraint_applies_after_width() {
    let tmp = TempDir::new().unwrap();
    let src = write_fixture(tmp.path(), "tall.gif", ImageFormat::Gif, 500, 1000);

    let (ok, dest) = shrink_to(&Imaging::new(), &src, Some(300), Some(100));
    assert!(ok);
    assert_eq!(output_size(&dest), (RasterFormat::Jpeg, 50, 100));
}

#[test]
fn text_file_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("notes.png");
    fs::write(&src, "definitely not pixels").unwrap();

    let (ok, dest) = shrink_to(&Imaging::new(), &src, Some(100), None);
    assert!(!ok);
    assert!(!dest.exists());
}

#[test]
fn text_starting_with_bm_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("club.txt");
    fs::write(&src, "BMW owners club meeting notes\n").unwrap();

    let (ok, dest) = shrink_to(&Imaging::new(), &src, Some(100), None);
    assert!(!ok);
    assert!(!dest.exists());
}

#[test]
fn tiff_is_unsupported_format() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("scan.tiff");
    let mut bytes = b"MM\0*\0\0\0\x08".to_vec();
    bytes.resize(128, 0);
    fs::write(&src, bytes).unwrap();

    let params = ShrinkParams::new(&src, tmp.path().join("out.jpg"));
    let err = Imaging::new().shrink(&params).unwrap_err();
    assert!(matches!(err, ShrinkError::UnsupportedFormat { .. }));
    assert!(err.to_string().contains("TIFF"));
}

#[test]
fn transparency_is_replaced_with_configured_color() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("logo.png");
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 0])))
        .save_with_format(&src, ImageFormat::Png)
        .unwrap();

    let imaging = Imaging::new().with_transparency(Rgb([0, 0, 255]));
    let (ok, dest) = shrink_to(&imaging, &src, Some(32), None);
    assert!(ok);

    let out = image::load_from_memory(&fs::read(&dest).unwrap())
        .unwrap()
        .to_rgb8();
    let [r, g, b] = out.get_pixel(16, 16).0;
    assert!(r < 16 && g < 16 && b > 239, "expected blue, got {:?}", [r, g, b]);
}

#[test]
fn failed_shrink_keeps_previous_output() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("broken.jpg");
    // Valid signature, truncated body
    fs::write(&src, [0xFF, 0xD8, 0xFF, 0xE0, 0x00]).unwrap();
    let dest = tmp.path().join("out.jpg");
    fs::write(&dest, b"previous").unwrap();

    let params = ShrinkParams::new(&src, &dest).max_width(10);
    assert!(!Imaging::new().shrink(&params).unwrap());
    assert_eq!(fs::read(&dest).unwrap(), b"previous");
}

#[test]
fn one_service_serves_many_threads() {
    let tmp = TempDir::new().unwrap();
    let imaging = Imaging::new().with_transparency(Rgb::WHITE);
    let sources: Vec<PathBuf> = (0..4)
        .map(|i| write_fixture(tmp.path(), &format!("src-{i}.png"), ImageFormat::Png, 200, 100))
        .collect();

    std::thread::scope(|scope| {
        for (i, src) in sources.iter().enumerate() {
            let imaging = &imaging;
            let dest = tmp.path().join(format!("out-{i}.jpg"));
            scope.spawn(move || {
                let params = ShrinkParams::new(src, &dest).max_width(50);
                assert!(imaging.shrink(&params).unwrap());
                assert_eq!(output_size(&dest), (RasterFormat::Jpeg, 50, 25));
            });
        }
    });
}
