// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{start_server, AppState};
use crate::config::ServiceConfig;
use crate::storage::UploadStore;
use crate::vision::VisionModelManager;

/// MemeSense node: OCR and tensor preprocessing for uploaded memes
#[derive(Parser, Debug, Default)]
#[command(name = "memesense-node")]
#[command(version)]
#[command(about = "Upload-and-process service for meme images", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, env = "MEMESENSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    pub listen_addr: Option<SocketAddr>,

    /// Directory uploads are written to
    #[arg(long)]
    pub upload_dir: Option<PathBuf>,

    /// Directory holding the PaddleOCR ONNX models
    #[arg(long)]
    pub ocr_model_dir: Option<PathBuf>,

    /// Maximum request body size in bytes
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// OCR languages, comma separated (e.g. en,tl)
    #[arg(long, value_delimiter = ',')]
    pub languages: Option<Vec<String>>,
}

impl Cli {
    /// Resolve the effective configuration
    ///
    /// Flags beat environment variables, which beat the config file.
    pub fn load_config(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };
        config.apply_env()?;
        self.apply_overrides(&mut config);
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut ServiceConfig) {
        if let Some(addr) = self.listen_addr {
            config.listen_addr = addr;
        }
        if let Some(ref dir) = self.upload_dir {
            config.upload_dir = dir.clone();
        }
        if let Some(ref dir) = self.ocr_model_dir {
            config.ocr.model_dir = dir.clone();
        }
        if let Some(bytes) = self.max_upload_bytes {
            config.max_upload_bytes = bytes;
        }
        if let Some(ref languages) = self.languages {
            config.ocr.languages = languages.clone();
        }
    }
}

/// Load models and serve until shutdown
pub async fn execute(cli: Cli) -> Result<()> {
    let config = cli.load_config()?;
    tracing::info!(
        listen_addr = %config.listen_addr,
        upload_dir = %config.upload_dir.display(),
        ocr_model_dir = %config.ocr.model_dir.display(),
        "Configuration loaded"
    );

    let manager = VisionModelManager::new(config.vision_model_config()?).await?;
    if !manager.has_ocr() {
        tracing::warn!("⚠️ OCR unavailable, /process_predict will answer 503");
    }

    let state = AppState::new(
        Arc::new(manager),
        UploadStore::new(&config.upload_dir),
        config.max_upload_bytes,
    );

    start_server(config.listen_addr, state).await
}
