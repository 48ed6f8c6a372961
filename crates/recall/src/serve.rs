// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recall serve`: open the index, build the embedder, run the gateway.

use std::sync::Arc;

use recall_config::model::{EmbeddingConfig, EmbeddingProvider, RecallConfig};
use recall_core::{EmbeddingAdapter, EmbeddingIndex, RecallError};
use recall_gateway::{GatewayState, start_server};
use recall_index::{HashingEmbedder, SqliteIndex};
use recall_memory::MemoryStore;
use tracing::{error, info};

use crate::shutdown;

/// Runs the `recall serve` command until SIGINT/SIGTERM.
pub async fn run_serve(config: RecallConfig) -> Result<(), RecallError> {
    init_tracing(&config.logging.level);

    info!(
        database = %config.storage.database_path,
        provider = ?config.embedding.provider,
        "starting recall serve"
    );

    let index = Arc::new(SqliteIndex::new(config.storage.clone()));
    index.initialize().await?;

    let embedder = build_embedder(&config.embedding).await?;
    info!(model = embedder.model_id(), dimensions = embedder.dimensions(), "embedder ready");

    let store = Arc::new(MemoryStore::new(index.clone(), embedder));
    let state = GatewayState::new(store, config.search.clone());

    let cancel = shutdown::install_signal_handler();
    let served = start_server(&config.server, state, cancel).await;

    if let Err(e) = index.close().await {
        error!(error = %e, "failed to close index cleanly");
    }
    info!("recall stopped");
    served
}

/// Builds the embedder selected by `[embedding].provider`.
pub async fn build_embedder(
    config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingAdapter>, RecallError> {
    match config.provider {
        EmbeddingProvider::Hashing => Ok(Arc::new(HashingEmbedder::new(config.dimensions)?)),
        EmbeddingProvider::Onnx => build_onnx_embedder(config).await,
    }
}

#[cfg(feature = "onnx")]
async fn build_onnx_embedder(
    config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingAdapter>, RecallError> {
    let manager = recall_index::ModelManager::new(&config.model_dir);
    let dir = manager.ensure_model().await?;
    let embedder = tokio::task::spawn_blocking(move || recall_index::OnnxEmbedder::new(&dir))
        .await
        .map_err(|e| RecallError::Internal(format!("embedder load task failed: {e}")))??;
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "onnx"))]
async fn build_onnx_embedder(
    _config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingAdapter>, RecallError> {
    Err(RecallError::Config(
        "embedding.provider = \"onnx\" requires a build with the `onnx` feature".into(),
    ))
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("recall={log_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashing_provider_uses_configured_dimensions() {
        let config = EmbeddingConfig {
            dimensions: 64,
            ..EmbeddingConfig::default()
        };
        let embedder = build_embedder(&config).await.unwrap();
        assert_eq!(embedder.dimensions(), 64);
        assert_eq!(embedder.model_id(), "hashing-bow-64");
    }

    #[cfg(not(feature = "onnx"))]
    #[tokio::test]
    async fn onnx_provider_without_feature_is_config_error() {
        let config = EmbeddingConfig {
            provider: EmbeddingProvider::Onnx,
            ..EmbeddingConfig::default()
        };
        assert!(matches!(
            build_embedder(&config).await,
            Err(RecallError::Config(_))
        ));
    }
}
