// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
};
use recall_config::model::{SearchConfig, ServerConfig};
use recall_core::RecallError;
use recall_memory::MemoryStore;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The message store all requests go through.
    pub store: Arc<MemoryStore>,
    /// Default and maximum `limit` for `/query`.
    pub search: SearchConfig,
    pub health: HealthState,
}

impl GatewayState {
    pub fn new(store: Arc<MemoryStore>, search: SearchConfig) -> Self {
        Self {
            store,
            search,
            health: HealthState {
                start_time: Instant::now(),
            },
        }
    }
}

/// Build the gateway router.
///
/// Routes:
/// - POST /add
/// - GET /query
/// - GET /health
///
/// Anything else answers 404 in plain text.
pub fn router(state: GatewayState, max_concurrent_requests: Option<usize>) -> Router {
    let app = Router::new()
        .route("/add", post(handlers::post_add))
        .route("/query", get(handlers::get_query))
        .route("/health", get(handlers::get_health))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    match max_concurrent_requests {
        Some(limit) => app.layer(GlobalConcurrencyLimitLayer::new(limit)),
        None => app,
    }
}

/// Bind to the configured host:port and serve until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), RecallError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| RecallError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    serve(
        listener,
        router(state, config.max_concurrent_requests),
        cancel,
    )
    .await
}

/// Serve `app` on an already-bound listener, shutting down gracefully when
/// `cancel` fires.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    cancel: CancellationToken,
) -> Result<(), RecallError> {
    if let Ok(addr) = listener.local_addr() {
        info!("gateway listening on {addr}");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| RecallError::Internal(format!("gateway server error: {e}")))?;

    info!("gateway stopped");
    Ok(())
}
