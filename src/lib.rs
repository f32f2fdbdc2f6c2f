// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod storage;
pub mod text;
pub mod version;
pub mod vision;

pub use api::{create_router, ApiError, AppState};
pub use config::ServiceConfig;
pub use storage::UploadStore;
pub use text::normalize;
pub use vision::ocr::{ExtractionResult, OcrExtractor, TextRecognizer};
pub use vision::{ImagePreprocessor, ImageTensor, VisionModelManager};
