// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides:
//! - OCR (Optical Character Recognition) via PaddleOCR
//! - ImageNet-style tensor preprocessing for downstream classifiers

pub mod image_utils;
pub mod model_manager;
pub mod ocr;
pub mod tensor;

pub use image_utils::{
    decode_image_bytes, detect_format, open_image, ImageError, ImageInfo, DEFAULT_MAX_IMAGE_BYTES,
};
pub use model_manager::{VisionModelConfig, VisionModelManager};
pub use tensor::{ImagePreprocessor, ImageTensor, TargetSize};
