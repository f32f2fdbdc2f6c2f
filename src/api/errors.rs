// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vision::image_utils::ImageError;
use crate::vision::ocr::ExtractionError;

/// JSON error body
///
/// Validation failures carry only `error`; everything else also names its
/// `error_type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    ValidationError(String),
    InvalidImage(String),
    ServiceUnavailable(String),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, message) = match self {
            ApiError::ValidationError(msg) => (None, msg.clone()),
            ApiError::InvalidImage(msg) => (Some("invalid_image"), msg.clone()),
            ApiError::ServiceUnavailable(msg) => (Some("service_unavailable"), msg.clone()),
            ApiError::InternalError(msg) => (Some("internal_error"), msg.clone()),
        };

        ErrorResponse {
            error: message,
            error_type: error_type.map(str::to_string),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        match err {
            // Unreadable stored upload is on our side, not the client's
            ImageError::Io { .. } => ApiError::InternalError(err.to_string()),
            _ => ApiError::InvalidImage(err.to_string()),
        }
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Image(image_err) => image_err.into(),
            ExtractionError::Engine(msg) => ApiError::InternalError(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
