// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR integration for text extraction from images
//!
//! This module provides CPU-based OCR using PaddleOCR ONNX models.
//!
//! Components:
//! - `detection` - Text region detection (DB)
//! - `recognition` - Text recognition from detected regions (CTC)
//! - `preprocessing` - Image preprocessing for models
//! - `model` - Combined OCR pipeline
//! - `extractor` - File-level extraction with normalization

pub mod detection;
pub mod extractor;
pub mod language;
pub mod model;
pub mod preprocessing;
pub mod recognition;

pub use detection::{DetectionConfig, OcrDetectionModel, TextBox};
pub use extractor::{ExtractionError, ExtractionResult, OcrExtractor, TextRecognizer};
pub use language::{parse_languages, OcrLanguage};
pub use model::{BoundingBox, OcrResult, PaddleOcrModel, TextRegion};
pub use recognition::{CharDictionary, OcrRecognitionModel, RecognizedText};
