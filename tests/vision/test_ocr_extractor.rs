// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! OCR extractor tests against encoded files on disk

use image::{DynamicImage, GenericImageView, ImageFormat};
use memesense_node::vision::{
    ocr::{ExtractionError, OcrExtractor, TextRecognizer},
    ImageError,
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Records the size of every image it is asked to read
struct RecordingRecognizer {
    seen: Mutex<Vec<(u32, u32)>>,
    fragments: Vec<&'static str>,
}

impl RecordingRecognizer {
    fn new(fragments: Vec<&'static str>) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            fragments,
        }
    }
}

impl TextRecognizer for RecordingRecognizer {
    fn recognize_text(&self, image: &DynamicImage) -> anyhow::Result<Vec<String>> {
        self.seen.lock().unwrap().push(image.dimensions());
        Ok(self.fragments.iter().map(|s| s.to_string()).collect())
    }
}

#[test]
fn test_engine_sees_full_resolution_image() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("meme.jpg");
    DynamicImage::new_rgb8(333, 777)
        .save_with_format(&path, ImageFormat::Jpeg)
        .unwrap();

    let engine = Arc::new(RecordingRecognizer::new(vec!["PAG", "MAY", "TIYAGA"]));
    let extractor = OcrExtractor::new(engine.clone());
    let result = extractor.extract(&path).unwrap();

    assert_eq!(*engine.seen.lock().unwrap(), vec![(333, 777)]);
    assert_eq!(result.raw_text, "PAG MAY TIYAGA");
    assert_eq!(result.normalized_text, "pag may tiyaga");
}

#[test]
fn test_nothing_recognized() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blank.png");
    DynamicImage::new_rgb8(20, 20).save(&path).unwrap();

    let extractor = OcrExtractor::new(Arc::new(RecordingRecognizer::new(vec![])));
    let result = extractor.extract(&path).unwrap();

    assert_eq!(result.raw_text, "");
    assert_eq!(result.normalized_text, "");
}

#[test]
fn test_unsupported_bytes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.png");
    std::fs::write(&path, "plain text, not pixels").unwrap();

    let engine = Arc::new(RecordingRecognizer::new(vec!["never"]));
    let extractor = OcrExtractor::new(engine.clone());
    let err = extractor.extract(&path).unwrap_err();

    assert!(matches!(
        err,
        ExtractionError::Image(ImageError::UnsupportedFormat)
    ));
    assert!(engine.seen.lock().unwrap().is_empty());
}
