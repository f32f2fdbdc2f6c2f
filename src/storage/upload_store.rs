// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload Storage Module
//!
//! Writes uploaded images under a temp directory so the OCR and tensor
//! stages can read them from disk. Files are left in place after the
//! request completes.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Prefix for every stored upload
pub const TEMP_FILE_PREFIX: &str = "temp_";

/// On-disk store for uploaded images
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a new upload named `basename` would be written to
    ///
    /// Each call yields a fresh name of the form `temp_{uuid}_{basename}`.
    pub fn temp_path_for(&self, basename: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}_{}", TEMP_FILE_PREFIX, Uuid::new_v4(), basename))
    }

    /// Write `content` under a collision-free name and return its path
    ///
    /// Creates the store directory if it does not exist yet.
    pub async fn persist(&self, basename: &str, content: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create upload dir {}", self.dir.display()))?;

        let path = self.temp_path_for(basename);
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write upload {}", path.display()))?;

        debug!("📥 Stored upload {} ({} bytes)", path.display(), content.len());
        Ok(path)
    }
}
