// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod http_server;
pub mod process_predict;

pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_router, start_server, AppState};
pub use process_predict::{process_predict_handler, PredictionData, ProcessPredictResponse};
