// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`RecallError`] to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use recall_core::RecallError;
use tracing::{error, warn};

/// A handler failure rendered as a plain-text response.
#[derive(Debug)]
pub struct ApiError(pub RecallError);

impl ApiError {
    /// Shorthand for a 400 with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError(RecallError::validation(message))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RecallError::Validation(_) => StatusCode::BAD_REQUEST,
            RecallError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RecallError> for ApiError {
    fn from(err: RecallError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            RecallError::Validation(message) => message,
            other => {
                if status == StatusCode::SERVICE_UNAVAILABLE {
                    warn!(error = %other, "store unavailable");
                } else {
                    error!(error = %other, "request failed");
                }
                other.to_string()
            }
        };
        (status, body).into_response()
    }
}
