// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-predict endpoint handler

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::multipart::MultipartRejection;
use axum_extra::extract::Multipart;
use tracing::{debug, error, info, warn};

use super::request::UploadedImage;
use super::response::{PredictionData, ProcessPredictResponse};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

/// POST /process_predict - OCR and tensorize an uploaded image
///
/// # Request
/// Multipart form with a file part named `image` (png, jpg or jpeg).
///
/// # Response
/// 201 with the stored path, raw and normalized OCR text, and the shape of
/// the image tensor.
///
/// # Errors
/// - 400 Bad Request: missing/empty/disallowed upload, malformed body
/// - 422 Unprocessable Entity: upload is not a decodable image
/// - 503 Service Unavailable: OCR model not loaded
/// - 500 Internal Server Error: storage or OCR failure
#[tracing::instrument(skip(state, multipart))]
pub async fn process_predict_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ProcessPredictResponse>), ApiError> {
    let multipart = multipart.map_err(|e| {
        warn!("Rejected non-multipart request: {}", e);
        ApiError::ValidationError(format!("Malformed multipart body: {}", e))
    })?;

    // 1. Extract and validate the upload
    let mut upload = UploadedImage::from_multipart(multipart)
        .await
        .inspect_err(|e| warn!("Upload rejected: {}", e))?;
    debug!(
        filename = %upload.filename,
        size_bytes = upload.content.len(),
        "Upload accepted"
    );

    // 2. OCR must be available before anything is written
    let extractor = state.vision_model_manager.ocr_extractor().ok_or_else(|| {
        warn!("OCR model not loaded");
        ApiError::ServiceUnavailable("OCR model not loaded".to_string())
    })?;
    let preprocessor = state.vision_model_manager.preprocessor();

    // 3. Persist
    let path = upload
        .persist(&state.upload_store)
        .await
        .map_err(|e| {
            error!("Failed to store upload: {:#}", e);
            ApiError::InternalError(format!("Failed to store upload: {}", e))
        })?
        .to_path_buf();

    // 4. OCR then tensor, off the async runtime
    let worker_path = path.clone();
    let (extraction, tensor) = tokio::task::spawn_blocking(move || {
        let extraction = extractor.extract(&worker_path)?;
        let tensor = preprocessor.preprocess_path(&worker_path)?;
        Ok::<_, ApiError>((extraction, tensor))
    })
    .await
    .map_err(|e| {
        error!("Processing task failed: {}", e);
        ApiError::InternalError(format!("Processing task failed: {}", e))
    })?
    .inspect_err(|e| match e {
        ApiError::InvalidImage(_) => warn!("Invalid image {}: {}", path.display(), e),
        _ => error!("Processing {} failed: {}", path.display(), e),
    })?;

    info!(
        image_path = %path.display(),
        text_chars = extraction.raw_text.len(),
        "Image processed"
    );

    // 5. Respond
    let response = ProcessPredictResponse::success(PredictionData {
        image_path: path.to_string_lossy().into_owned(),
        text: extraction.raw_text,
        preprocessed_text: extraction.normalized_text,
        image_tensor_shape: tensor.shape(),
    });

    Ok((StatusCode::CREATED, Json(response)))
}
