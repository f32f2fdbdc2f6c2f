// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload-and-process endpoint
//!
//! Provides POST /process_predict: stores an uploaded image, runs OCR on it
//! and builds its image tensor.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::process_predict_handler;
pub use request::{allowed_file, sanitize_filename, UploadedImage, ALLOWED_EXTENSIONS};
pub use response::{PredictionData, ProcessPredictResponse};
