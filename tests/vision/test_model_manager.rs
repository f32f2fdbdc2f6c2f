// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Vision Model Manager tests
//!
//! These tests verify that the VisionModelManager:
//! - Builds its config from the service configuration
//! - Survives a missing OCR model directory
//! - Hands out extractors over a shared engine
//! - Lists component availability

use image::DynamicImage;
use memesense_node::config::ServiceConfig;
use memesense_node::vision::{
    ocr::{OcrLanguage, TextRecognizer},
    TargetSize, VisionModelConfig, VisionModelManager,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Model paths (downloaded by download scripts)
const OCR_MODEL_DIR: &str = "./models/paddleocr-onnx";

struct CountingRecognizer {
    calls: AtomicUsize,
}

impl TextRecognizer for CountingRecognizer {
    fn recognize_text(&self, _image: &DynamicImage) -> anyhow::Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec!["MABUHAY".to_string()])
    }
}

#[cfg(test)]
mod model_manager_tests {
    use super::*;

    #[test]
    fn test_default_config_has_expected_paths() {
        let config = VisionModelConfig::default();
        assert!(config
            .ocr_model_dir
            .as_ref()
            .unwrap()
            .to_string_lossy()
            .contains("paddleocr"));
        assert_eq!(
            config.languages,
            vec![OcrLanguage::English, OcrLanguage::Tagalog]
        );
    }

    #[test]
    fn test_config_from_service_config() {
        let mut service = ServiceConfig::default();
        service.ocr.model_dir = PathBuf::from("/custom/ocr");
        service.ocr.languages = vec!["tl".to_string()];
        service.tensor.target_width = 320;

        let config = service.vision_model_config().unwrap();
        assert_eq!(config.ocr_model_dir, Some(PathBuf::from("/custom/ocr")));
        assert_eq!(config.languages, vec![OcrLanguage::Tagalog]);
        assert_eq!(config.tensor_size.width, 320);
        assert_eq!(config.tensor_size.height, 224);
    }

    #[tokio::test]
    async fn test_ocr_disabled() {
        let config = VisionModelConfig {
            ocr_model_dir: None,
            ..Default::default()
        };
        let manager = VisionModelManager::new(config).await.unwrap();

        assert!(!manager.has_ocr());
        assert!(manager.ocr_extractor().is_none());
    }

    #[tokio::test]
    async fn test_missing_model_dir_is_graceful() {
        let config = VisionModelConfig {
            ocr_model_dir: Some(PathBuf::from("/nonexistent/path/paddleocr")),
            ..Default::default()
        };
        let manager = VisionModelManager::new(config).await.unwrap();

        assert!(!manager.has_ocr());
        assert!(manager.ocr_extractor().is_none());
    }

    #[test]
    fn test_extractors_share_one_engine() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("meme.png");
        DynamicImage::new_rgb8(12, 12).save(&path).unwrap();

        let engine = Arc::new(CountingRecognizer {
            calls: AtomicUsize::new(0),
        });
        let shared: Arc<dyn TextRecognizer> = engine.clone();
        let manager = VisionModelManager::with_recognizer(Some(shared), TargetSize::default());

        let first = manager.ocr_extractor().unwrap().extract(&path).unwrap();
        let second = manager.ocr_extractor().unwrap().extract(&path).unwrap();

        assert_eq!(first.normalized_text, "mabuhay");
        assert_eq!(first, second);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_preprocessor_uses_configured_size() {
        let manager = VisionModelManager::with_recognizer(
            None,
            TargetSize {
                height: 64,
                width: 32,
            },
        );
        let tensor = manager
            .preprocessor()
            .preprocess(&DynamicImage::new_rgb8(100, 100));
        assert_eq!(tensor.shape(), [1, 3, 64, 32]);
    }

    #[tokio::test]
    #[ignore] // Only run if model files are downloaded
    async fn test_load_real_ocr_model() {
        let config = VisionModelConfig {
            ocr_model_dir: Some(PathBuf::from(OCR_MODEL_DIR)),
            ..Default::default()
        };
        let manager = VisionModelManager::new(config).await.unwrap();
        assert!(manager.has_ocr());
    }
}
