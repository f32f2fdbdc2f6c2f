// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision model manager for loading the OCR engine and tensor preprocessor

use std::path::PathBuf;
use std::sync::Arc;

use crate::vision::ocr::{
    DetectionConfig, OcrExtractor, OcrLanguage, PaddleOcrModel, TextRecognizer,
};
use crate::vision::image_utils::DEFAULT_MAX_IMAGE_BYTES;
use crate::vision::tensor::{ImagePreprocessor, TargetSize};

/// Configuration for loading vision models
#[derive(Debug, Clone)]
pub struct VisionModelConfig {
    /// Path to OCR model directory (None disables OCR)
    pub ocr_model_dir: Option<PathBuf>,
    /// Recognition languages
    pub languages: Vec<OcrLanguage>,
    /// Detector post-processing
    pub detection: DetectionConfig,
    /// Output size of the image tensor
    pub tensor_size: TargetSize,
    /// Largest stored image the extractor and preprocessor will decode
    pub max_image_bytes: usize,
}

impl Default for VisionModelConfig {
    fn default() -> Self {
        Self {
            ocr_model_dir: Some(PathBuf::from("./models/paddleocr-onnx")),
            languages: vec![OcrLanguage::English, OcrLanguage::Tagalog],
            detection: DetectionConfig::default(),
            tensor_size: TargetSize::default(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

/// Holds the process-wide OCR engine and tensor preprocessor
///
/// The engine is loaded once and shared read-only by every request.
#[derive(Clone)]
pub struct VisionModelManager {
    ocr_model: Option<Arc<dyn TextRecognizer>>,
    preprocessor: ImagePreprocessor,
    max_image_bytes: usize,
}

impl std::fmt::Debug for VisionModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionModelManager")
            .field("has_ocr", &self.has_ocr())
            .field("preprocessor", &self.preprocessor)
            .field("max_image_bytes", &self.max_image_bytes)
            .finish()
    }
}

impl VisionModelManager {
    /// Create a new VisionModelManager with the given configuration
    ///
    /// A missing or broken OCR model is logged and leaves OCR unavailable;
    /// the server still starts.
    pub async fn new(config: VisionModelConfig) -> anyhow::Result<Self> {
        let ocr_model: Option<Arc<dyn TextRecognizer>> = match config.ocr_model_dir {
            Some(ref dir) => {
                match PaddleOcrModel::new(dir, &config.languages, config.detection).await {
                    Ok(model) => {
                        tracing::info!("✅ PaddleOCR model loaded from {}", dir.display());
                        Some(Arc::new(model))
                    }
                    Err(e) => {
                        tracing::warn!(
                            "⚠️ Failed to load OCR model from {}: {:#}",
                            dir.display(),
                            e
                        );
                        None
                    }
                }
            }
            None => None,
        };

        Ok(Self::with_recognizer(ocr_model, config.tensor_size)
            .with_max_image_bytes(config.max_image_bytes))
    }

    /// Build a manager around an already constructed engine
    pub fn with_recognizer(
        ocr_model: Option<Arc<dyn TextRecognizer>>,
        tensor_size: TargetSize,
    ) -> Self {
        Self {
            ocr_model,
            preprocessor: ImagePreprocessor::new(tensor_size),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Cap the encoded size of images handed to OCR and the preprocessor
    ///
    /// Should match the upload limit so anything accepted can be decoded.
    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self.preprocessor = self.preprocessor.with_max_image_bytes(max_image_bytes);
        self
    }

    /// Extractor over the shared engine, if OCR is loaded
    pub fn ocr_extractor(&self) -> Option<OcrExtractor> {
        let max_image_bytes = self.max_image_bytes;
        self.ocr_model
            .clone()
            .map(|engine| OcrExtractor::new(engine).with_max_image_bytes(max_image_bytes))
    }

    pub fn preprocessor(&self) -> ImagePreprocessor {
        self.preprocessor
    }

    /// Check if OCR is available
    pub fn has_ocr(&self) -> bool {
        self.ocr_model.is_some()
    }
}
