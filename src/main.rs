// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use memesense_node::cli::{self, Cli};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!(
        "🚀 Starting {} ({})",
        memesense_node::version::get_version_string(),
        memesense_node::version::VERSION
    );
    tracing::debug!("Features: {}", memesense_node::version::FEATURES.join(", "));

    cli::execute(Cli::parse()).await
}
