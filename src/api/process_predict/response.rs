// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Response types for POST /process_predict

use serde::{Deserialize, Serialize};

pub const STATUS_SUCCESS: &str = "success";
pub const MSG_PROCESSED: &str = "Image processed successfully";

/// Per-image results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionData {
    /// Where the upload was stored
    pub image_path: String,
    /// Raw OCR text
    pub text: String,
    /// Normalized OCR text
    pub preprocessed_text: String,
    /// `[batch, channels, height, width]`
    pub image_tensor_shape: [usize; 4],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessPredictResponse {
    pub status: String,
    pub message: String,
    pub data: PredictionData,
}

impl ProcessPredictResponse {
    pub fn success(data: PredictionData) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: MSG_PROCESSED.to_string(),
            data,
        }
    }
}
