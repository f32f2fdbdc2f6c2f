// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload extraction and validation for POST /process_predict

use axum_extra::extract::Multipart;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::api::errors::ApiError;
use crate::storage::UploadStore;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

/// Extensions accepted for upload (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub const MSG_NO_IMAGE: &str = "No image file provided";
pub const MSG_NO_SELECTED_FILE: &str = "No selected file";
pub const MSG_TYPE_NOT_ALLOWED: &str = "File type not allowed";

/// An image received in a request
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Client-supplied filename, as sent
    pub filename: String,
    pub content: Bytes,
    /// Set once the upload has been written to disk
    pub storage_path: Option<PathBuf>,
}

impl UploadedImage {
    pub fn new(filename: impl Into<String>, content: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content,
            storage_path: None,
        }
    }

    /// Pull the `image` file part out of a multipart body and validate it
    ///
    /// Parts named `image` that are not files (no filename attribute) are
    /// skipped, so a plain form value does not count as an upload.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::ValidationError(format!("Malformed multipart body: {}", e)))?
        {
            if field.name() != Some(IMAGE_FIELD) {
                continue;
            }
            let Some(filename) = field.file_name().map(str::to_string) else {
                continue;
            };

            let content = field.bytes().await.map_err(|e| {
                ApiError::ValidationError(format!("Failed to read uploaded file: {}", e))
            })?;

            let upload = Self::new(filename, content);
            upload.validate()?;
            return Ok(upload);
        }

        Err(ApiError::ValidationError(MSG_NO_IMAGE.to_string()))
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.filename.is_empty() {
            return Err(ApiError::ValidationError(MSG_NO_SELECTED_FILE.to_string()));
        }
        if !allowed_file(&self.filename) {
            return Err(ApiError::ValidationError(MSG_TYPE_NOT_ALLOWED.to_string()));
        }
        Ok(())
    }

    /// Write the upload into `store` and record where it landed
    pub async fn persist(&mut self, store: &UploadStore) -> anyhow::Result<&Path> {
        let path = store.persist(&self.safe_basename(), &self.content).await?;
        Ok(self.storage_path.insert(path).as_path())
    }

    /// Filename safe to use as the last path component on disk
    pub fn safe_basename(&self) -> String {
        sanitize_filename(&self.filename)
    }
}

/// True when `filename` has an extension in [`ALLOWED_EXTENSIONS`]
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Reduce a client filename to a plain basename
///
/// Drops any directory part (either separator style), replaces whitespace
/// with `_`, keeps only ASCII alphanumerics plus `.`, `-`, `_`, and strips
/// leading dots. Falls back to `upload` plus the original extension when
/// no `stem.ext` name survives.
pub fn sanitize_filename(filename: &str) -> String {
    let last = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let base = Path::new(last)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                Some(c)
            } else {
                None
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();

    let usable = matches!(
        cleaned.rsplit_once('.'),
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty()
    );
    if usable {
        return cleaned;
    }

    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!("upload.{}", ext.to_lowercase()),
        _ => "upload".to_string(),
    }
}
