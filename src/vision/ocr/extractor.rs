// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction from image files
//!
//! Wraps an OCR engine behind [`TextRecognizer`] and pairs its raw output
//! with the normalized form.

use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::text::normalize;
use crate::vision::image_utils::{open_image, ImageError, DEFAULT_MAX_IMAGE_BYTES};

/// OCR engine seam
///
/// Returns recognized fragments in reading order.
#[cfg_attr(test, mockall::automock)]
pub trait TextRecognizer: Send + Sync {
    fn recognize_text(&self, image: &DynamicImage) -> anyhow::Result<Vec<String>>;
}

/// Text extracted from one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Fragments joined by single spaces, as recognized
    pub raw_text: String,
    /// `normalize(raw_text)`
    pub normalized_text: String,
}

impl ExtractionResult {
    pub fn from_fragments<S: AsRef<str>>(fragments: &[S]) -> Self {
        let raw_text = fragments
            .iter()
            .map(|f| f.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        let normalized_text = normalize(&raw_text);
        Self {
            raw_text,
            normalized_text,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Input could not be read or decoded
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("OCR engine failed: {0}")]
    Engine(String),
}

/// Runs OCR on image files
#[derive(Clone)]
pub struct OcrExtractor {
    engine: Arc<dyn TextRecognizer>,
    max_image_bytes: usize,
}

impl std::fmt::Debug for OcrExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrExtractor")
            .field("max_image_bytes", &self.max_image_bytes)
            .finish_non_exhaustive()
    }
}

impl OcrExtractor {
    pub fn new(engine: Arc<dyn TextRecognizer>) -> Self {
        Self {
            engine,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Largest encoded file `extract` will decode
    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    /// Extract raw and normalized text from the image at `path`
    ///
    /// Blocking: decodes the image and runs inference on the calling thread.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<ExtractionResult, ExtractionError> {
        let (image, info) = open_image(path.as_ref(), self.max_image_bytes)?;
        debug!(
            "Running OCR on {} ({}x{})",
            path.as_ref().display(),
            info.width,
            info.height
        );

        let fragments = self
            .engine
            .recognize_text(&image)
            .map_err(|e| ExtractionError::Engine(format!("{:#}", e)))?;

        Ok(ExtractionResult::from_fragments(&fragments))
    }
}
