// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::process_predict::process_predict_handler;
use crate::storage::UploadStore;
use crate::vision::VisionModelManager;

/// Shared state handed to every request
#[derive(Clone, Debug)]
pub struct AppState {
    pub vision_model_manager: Arc<VisionModelManager>,
    pub upload_store: UploadStore,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        vision_model_manager: Arc<VisionModelManager>,
        upload_store: UploadStore,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            vision_model_manager,
            upload_store,
            max_upload_bytes,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/process_predict", post(process_predict_handler))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("🚀 API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
