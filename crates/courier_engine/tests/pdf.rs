use std::io::Cursor;
use std::path::PathBuf;

use courier_engine::{assemble_pdf, normalize_to_jpeg, upscale_to_jpeg, DocumentAssembler, JpegPdfAssembler};

fn jpeg_file(dir: &std::path::Path, name: &str, width: u32, height: u32) -> PathBuf {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 200, 40]));
    let mut png = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut png, image::ImageFormat::Png)
        .expect("png encodes");
    let jpeg = normalize_to_jpeg(png.get_ref()).expect("normalizes");
    let path = dir.join(name);
    std::fs::write(&path, jpeg).expect("writes");
    path
}

#[test]
fn assembles_ordered_pages_into_one_pdf() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let pages = vec![
        jpeg_file(tmp.path(), "001.jpg", 16, 24),
        jpeg_file(tmp.path(), "002.jpg", 16, 24),
        jpeg_file(tmp.path(), "003.jpg", 16, 24),
    ];
    let out = tmp.path().join("chapter.pdf");

    let wrote = assemble_pdf(&pages, &out).expect("assembles");

    assert!(wrote);
    let bytes = std::fs::read(&out).expect("pdf readable");
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn empty_page_list_warns_and_writes_nothing() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("empty.pdf");

    let wrote = assemble_pdf(&[], &out).expect("no-op ok");

    assert!(!wrote);
    assert!(!out.exists());
}

#[test]
fn assembler_trait_matches_the_free_function() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let pages = vec![jpeg_file(tmp.path(), "001.jpg", 8, 8)];
    let out = tmp.path().join("one.pdf");

    let wrote = JpegPdfAssembler.assemble(&pages, &out).expect("assembles");

    assert!(wrote);
    assert!(out.exists());
}

#[test]
fn normalization_preserves_dimensions() {
    let img = image::RgbImage::from_pixel(10, 20, image::Rgb([1, 2, 3]));
    let mut png = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut png, image::ImageFormat::Png)
        .expect("png encodes");

    let jpeg = normalize_to_jpeg(png.get_ref()).expect("normalizes");
    let decoded = image::load_from_memory(&jpeg).expect("valid jpeg");
    assert_eq!((decoded.width(), decoded.height()), (10, 20));
}

#[test]
fn upscaling_applies_the_fixed_factor() {
    let img = image::RgbImage::from_pixel(10, 20, image::Rgb([1, 2, 3]));
    let mut png = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut png, image::ImageFormat::Png)
        .expect("png encodes");

    let jpeg = upscale_to_jpeg(png.get_ref()).expect("upscales");
    let decoded = image::load_from_memory(&jpeg).expect("valid jpeg");
    assert_eq!((decoded.width(), decoded.height()), (15, 30));
}

#[test]
fn garbage_bytes_are_an_image_error() {
    let err = normalize_to_jpeg(b"definitely not an image").unwrap_err();
    assert_eq!(err.kind, courier_engine::FailureKind::Image);
}
