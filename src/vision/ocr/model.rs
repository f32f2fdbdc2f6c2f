// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR model wrapper for text detection and recognition

use anyhow::{bail, Context, Result};
use image::{DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use super::detection::{DetectionConfig, OcrDetectionModel, TextBox};
use super::extractor::TextRecognizer;
use super::language::{recognition_dictionary, OcrLanguage};
use super::preprocessing::{
    preprocess_for_detection, preprocess_for_recognition, PreprocessInfo, OCR_INPUT_SIZE,
};
use super::recognition::OcrRecognitionModel;

/// Detection model file name inside the model directory
pub const DETECTION_MODEL_FILE: &str = "det_model.onnx";

/// Recognition model file name inside the model directory
pub const RECOGNITION_MODEL_FILE: &str = "rec_model.onnx";

/// Bounding box for detected text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A detected text region with bounding box
#[derive(Debug, Clone)]
pub struct TextRegion {
    /// Extracted text content
    pub text: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// Bounding box location in original image pixels
    pub bounding_box: BoundingBox,
}

/// Result of OCR processing
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Full extracted text (regions joined by single spaces)
    pub text: String,
    /// Average confidence score
    pub confidence: f32,
    /// Individual text regions in reading order
    pub regions: Vec<TextRegion>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl OcrResult {
    /// Assemble a result from recognized regions, preserving their order
    pub fn from_regions(regions: Vec<TextRegion>, processing_time_ms: u64) -> Self {
        let text = regions
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let confidence = if regions.is_empty() {
            0.0
        } else {
            regions.iter().map(|r| r.confidence).sum::<f32>() / regions.len() as f32
        };

        Self {
            text,
            confidence,
            regions,
            processing_time_ms,
        }
    }

    /// Recognized fragments in engine order
    pub fn fragments(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.text.clone()).collect()
    }
}

/// PaddleOCR model for text extraction
///
/// Combines text detection and recognition models for end-to-end OCR.
/// Runs on CPU only.
#[derive(Debug, Clone)]
pub struct PaddleOcrModel {
    detector: OcrDetectionModel,
    recognizer: OcrRecognitionModel,
}

impl PaddleOcrModel {
    /// Load PaddleOCR models from the specified directory
    ///
    /// Expected files:
    /// - det_model.onnx (text detection)
    /// - rec_model.onnx (text recognition)
    /// - the character dictionary for `languages` (latin_dict.txt)
    pub async fn new<P: AsRef<Path>>(
        model_dir: P,
        languages: &[OcrLanguage],
        detection: DetectionConfig,
    ) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let dictionary = recognition_dictionary(languages)?;

        let missing: Vec<String> = Self::required_files(model_dir, languages)?
            .into_iter()
            .filter(|path| !path.exists())
            .map(|path| path.display().to_string())
            .collect();
        if !missing.is_empty() {
            bail!("Missing OCR model files: {}", missing.join(", "));
        }

        info!(
            "Loading PaddleOCR models from {} (languages: {})",
            model_dir.display(),
            languages
                .iter()
                .map(|l| l.code())
                .collect::<Vec<_>>()
                .join(",")
        );

        let detector = OcrDetectionModel::new(model_dir.join(DETECTION_MODEL_FILE), detection)
            .await
            .context("Failed to load OCR detection model")?;

        let recognizer = OcrRecognitionModel::new(
            model_dir.join(RECOGNITION_MODEL_FILE),
            model_dir.join(dictionary),
        )
        .await
        .context("Failed to load OCR recognition model")?;

        Ok(Self {
            detector,
            recognizer,
        })
    }

    /// Files that must exist under `model_dir` for `new` to succeed
    pub fn required_files(model_dir: &Path, languages: &[OcrLanguage]) -> Result<Vec<PathBuf>> {
        Ok(vec![
            model_dir.join(DETECTION_MODEL_FILE),
            model_dir.join(RECOGNITION_MODEL_FILE),
            model_dir.join(recognition_dictionary(languages)?),
        ])
    }

    /// Process an image and extract text
    ///
    /// Pipeline:
    /// 1. Detect text boxes on a padded 640x640 copy
    /// 2. Map each box back to original pixels and crop
    /// 3. Recognize each crop, dropping empty results
    pub fn process(&self, image: &DynamicImage) -> Result<OcrResult> {
        let start = Instant::now();

        let info = PreprocessInfo::new(image, OCR_INPUT_SIZE);
        let det_input = preprocess_for_detection(image);
        let boxes = self.detector.detect(&det_input)?;
        debug!("Detected {} text boxes", boxes.len());

        let mut regions = Vec::with_capacity(boxes.len());
        for text_box in &boxes {
            if let Some(region) = self.recognize_box(image, &info, text_box)? {
                regions.push(region);
            }
        }

        let elapsed = start.elapsed().as_millis() as u64;
        let result = OcrResult::from_regions(regions, elapsed);
        debug!(
            "OCR produced {} regions in {}ms",
            result.regions.len(),
            result.processing_time_ms
        );
        Ok(result)
    }

    fn recognize_box(
        &self,
        image: &DynamicImage,
        info: &PreprocessInfo,
        text_box: &TextBox,
    ) -> Result<Option<TextRegion>> {
        let Some((x, y, width, height)) =
            info.map_box_to_original(text_box.x, text_box.y, text_box.width, text_box.height)
        else {
            return Ok(None);
        };

        let crop = image.crop_imm(x, y, width, height);
        if crop.dimensions().0 == 0 || crop.dimensions().1 == 0 {
            return Ok(None);
        }

        let rec_input = preprocess_for_recognition(&crop);
        let recognized = self.recognizer.recognize(&rec_input)?;
        if recognized.is_empty() {
            return Ok(None);
        }

        Ok(Some(TextRegion {
            text: recognized.text,
            confidence: recognized.confidence * text_box.confidence,
            bounding_box: BoundingBox {
                x,
                y,
                width,
                height,
            },
        }))
    }
}

impl TextRecognizer for PaddleOcrModel {
    fn recognize_text(&self, image: &DynamicImage) -> Result<Vec<String>> {
        Ok(self.process(image)?.fragments())
    }
}
