// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Image tensor preprocessing tests
//!
//! Exercises the file-path entry point with real encoded images on disk.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use memesense_node::vision::{
    tensor::{IMAGENET_MEAN, IMAGENET_STD},
    ImageError, ImagePreprocessor, TargetSize,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn write_image(dir: &TempDir, name: &str, image: &DynamicImage, format: ImageFormat) -> PathBuf {
    let path = dir.path().join(name);
    image
        .save_with_format(&path, format)
        .expect("Failed to write test image");
    path
}

#[test]
fn test_png_and_jpeg_give_default_shape() {
    let dir = TempDir::new().unwrap();
    let preprocessor = ImagePreprocessor::default();

    let png = write_image(&dir, "a.png", &DynamicImage::new_rgb8(300, 200), ImageFormat::Png);
    let jpg = write_image(&dir, "b.jpg", &DynamicImage::new_rgb8(50, 900), ImageFormat::Jpeg);

    assert_eq!(preprocessor.preprocess_path(&png).unwrap().shape(), [1, 3, 224, 224]);
    assert_eq!(preprocessor.preprocess_path(&jpg).unwrap().shape(), [1, 3, 224, 224]);
}

#[test]
fn test_rgba_png_drops_alpha() {
    let dir = TempDir::new().unwrap();
    let path = write_image(&dir, "alpha.png", &DynamicImage::new_rgba8(40, 40), ImageFormat::Png);

    let tensor = ImagePreprocessor::default().preprocess_path(&path).unwrap();
    assert_eq!(tensor.shape()[1], 3);
}

#[test]
fn test_custom_target_size_from_path() {
    let dir = TempDir::new().unwrap();
    let path = write_image(&dir, "c.png", &DynamicImage::new_rgb8(10, 10), ImageFormat::Png);

    let preprocessor = ImagePreprocessor::new(TargetSize {
        height: 128,
        width: 96,
    });
    assert_eq!(preprocessor.preprocess_path(&path).unwrap().shape(), [1, 3, 128, 96]);
}

#[test]
fn test_black_image_values() {
    let dir = TempDir::new().unwrap();
    let black = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([0, 0, 0])));
    let path = write_image(&dir, "black.png", &black, ImageFormat::Png);

    let tensor = ImagePreprocessor::default().preprocess_path(&path).unwrap();
    for c in 0..3 {
        let expected = -IMAGENET_MEAN[c] / IMAGENET_STD[c];
        let actual = tensor.values()[[0, c, 112, 112]];
        assert!((actual - expected).abs() < 1e-5, "channel {}", c);
    }
}

#[test]
fn test_extension_does_not_decide_format() {
    let dir = TempDir::new().unwrap();
    // PNG bytes behind a .jpg name still decode
    let path = write_image(&dir, "actually_png.jpg", &DynamicImage::new_rgb8(8, 8), ImageFormat::Png);
    assert!(ImagePreprocessor::default().preprocess_path(&path).is_ok());
}

#[test]
fn test_garbage_file_is_decode_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.png");
    std::fs::write(&path, b"\x89PNG\r\n\x1a\nthen nonsense").unwrap();

    let err = ImagePreprocessor::default().preprocess_path(&path).unwrap_err();
    assert!(matches!(err, ImageError::DecodeFailed(_)), "got {:?}", err);
}

#[test]
fn test_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.png");
    std::fs::write(&path, b"").unwrap();

    let err = ImagePreprocessor::default().preprocess_path(&path).unwrap_err();
    assert!(matches!(err, ImageError::EmptyData));
}
