// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Built in layers: defaults, then an optional TOML file, then environment
//! variables, then command-line flags. `validate` runs once at startup.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};

use crate::vision::ocr::{parse_languages, DetectionConfig};
use crate::vision::{TargetSize, VisionModelConfig};

pub const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 5001));
pub const DEFAULT_UPLOAD_DIR: &str = "image_test";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_OCR_MODEL_DIR: &str = "./models/paddleocr-onnx";

pub const ENV_LISTEN_ADDR: &str = "LISTEN_ADDR";
pub const ENV_UPLOAD_DIR: &str = "UPLOAD_DIR";
pub const ENV_OCR_MODEL_DIR: &str = "OCR_MODEL_DIR";
pub const ENV_MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";

/// OCR engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OcrConfig {
    pub model_dir: PathBuf,
    /// Language codes, e.g. `["en", "tl"]`
    pub languages: Vec<String>,
    /// Detector pixel threshold (0.0-1.0)
    pub detection_threshold: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_OCR_MODEL_DIR),
            languages: vec!["en".to_string(), "tl".to_string()],
            detection_threshold: DetectionConfig::default().threshold,
        }
    }
}

/// Image tensor output size
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TensorConfig {
    pub target_height: u32,
    pub target_width: u32,
}

impl Default for TensorConfig {
    fn default() -> Self {
        let size = TargetSize::default();
        Self {
            target_height: size.height,
            target_width: size.width,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub listen_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub ocr: OcrConfig,
    pub tensor: TensorConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            ocr: OcrConfig::default(),
            tensor: TensorConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    ///
    /// Keys missing from the file keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Set but unparseable values are an error rather than silently ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_LISTEN_ADDR) {
            self.listen_addr = val
                .parse()
                .with_context(|| format!("Invalid {}: {}", ENV_LISTEN_ADDR, val))?;
        }

        if let Some(val) = lookup(ENV_UPLOAD_DIR) {
            self.upload_dir = PathBuf::from(val);
        }

        if let Some(val) = lookup(ENV_OCR_MODEL_DIR) {
            self.ocr.model_dir = PathBuf::from(val);
        }

        if let Some(val) = lookup(ENV_MAX_UPLOAD_BYTES) {
            self.max_upload_bytes = val
                .parse()
                .with_context(|| format!("Invalid {}: {}", ENV_MAX_UPLOAD_BYTES, val))?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(anyhow!("max_upload_bytes must be greater than 0"));
        }
        if self.upload_dir.as_os_str().is_empty() {
            return Err(anyhow!("upload_dir must not be empty"));
        }
        if self.tensor.target_height == 0 || self.tensor.target_width == 0 {
            return Err(anyhow!(
                "tensor target size must be non-zero, got {}x{}",
                self.tensor.target_width,
                self.tensor.target_height
            ));
        }
        if !(0.0..=1.0).contains(&self.ocr.detection_threshold) {
            return Err(anyhow!(
                "ocr.detection_threshold must be within [0, 1], got {}",
                self.ocr.detection_threshold
            ));
        }
        parse_languages(&self.ocr.languages)?;
        Ok(())
    }

    pub fn target_size(&self) -> TargetSize {
        TargetSize {
            height: self.tensor.target_height,
            width: self.tensor.target_width,
        }
    }

    /// Model settings for `VisionModelManager`
    pub fn vision_model_config(&self) -> Result<VisionModelConfig> {
        Ok(VisionModelConfig {
            ocr_model_dir: Some(self.ocr.model_dir.clone()),
            languages: parse_languages(&self.ocr.languages)?,
            detection: DetectionConfig {
                threshold: self.ocr.detection_threshold,
                ..DetectionConfig::default()
            },
            tensor_size: self.target_size(),
            max_image_bytes: self.max_upload_bytes,
        })
    }
}
