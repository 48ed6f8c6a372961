// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! Handles POST /add, GET /query, GET /health, and the 404 fallback.
//! Client errors are answered in plain text; successful queries in JSON.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use recall_core::{HealthStatus, Message, Scalar};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Request body for POST /add.
///
/// Every field is optional at the type level so a missing one is reported
/// by name instead of as a generic deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRequest {
    pub id: Option<String>,
    pub author: Option<String>,
    pub content: Option<String>,
    pub timestamp: Option<Scalar>,
    pub channel_id: Option<String>,
    pub sequence: Option<Scalar>,
}

impl AddRequest {
    fn into_message(self) -> Result<Message, ApiError> {
        fn required<T>(value: Option<T>, name: &str) -> Result<T, ApiError> {
            value.ok_or_else(|| ApiError::bad_request(format!("Missing '{name}' field")))
        }

        Ok(Message {
            id: required(self.id, "id")?,
            author: required(self.author, "author")?,
            content: required(self.content, "content")?,
            timestamp: required(self.timestamp, "timestamp")?,
            channel_id: required(self.channel_id, "channelId")?,
            sequence: required(self.sequence, "sequence")?,
        })
    }
}

/// Query string for GET /query.
#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    pub q: Option<String>,
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    /// Kept as text so a malformed value is a 400 with a clear message.
    pub limit: Option<String>,
}

/// Response body for GET /query.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok", "degraded", or "unhealthy".
    pub status: String,
    /// Binary version.
    pub version: String,
    pub uptime_secs: u64,
}

/// POST /add
///
/// Stores one message. Re-posting an id that is already stored succeeds
/// without changing anything.
pub async fn post_add(
    State(state): State<GatewayState>,
    body: Result<Json<AddRequest>, JsonRejection>,
) -> Result<&'static str, ApiError> {
    let Json(request) =
        body.map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e.body_text())))?;
    let message = request.into_message()?;
    state.store.put(&message).await?;
    Ok("ok")
}

/// GET /query
pub async fn get_query(
    State(state): State<GatewayState>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Query(params) =
        params.map_err(|e| ApiError::bad_request(format!("Invalid query string: {}", e.body_text())))?;

    let query = params
        .q
        .ok_or_else(|| ApiError::bad_request("Missing 'q' parameter"))?;
    let channel_id = params
        .channel_id
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing 'channelId' parameter"))?;
    let limit = resolve_limit(params.limit.as_deref(), &state)?;

    let messages = state.store.search(&channel_id, &query, limit).await?;
    Ok(Json(QueryResponse { messages }))
}

/// Parse `limit`, falling back to the configured default and clamping to the
/// configured maximum.
fn resolve_limit(raw: Option<&str>, state: &GatewayState) -> Result<usize, ApiError> {
    let Some(raw) = raw else {
        return Ok(state.search.default_limit.min(state.search.max_limit));
    };
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(ApiError::bad_request(
            "'limit' must be a positive integer",
        )),
        Ok(n) => Ok(n.min(state.search.max_limit)),
    }
}

/// GET /health
///
/// Always 200; `status` reflects the index health check.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let status = match state.store.index().health_check().await {
        Ok(HealthStatus::Healthy) => "ok",
        Ok(HealthStatus::Degraded(_)) => "degraded",
        Ok(HealthStatus::Unhealthy(_)) | Err(_) => "unhealthy",
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

/// Fallback for unknown paths.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}
