// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Recall memory service.

use thiserror::Error;

/// The primary error type used across the index, store, and gateway layers.
#[derive(Debug, Error)]
pub enum RecallError {
    /// A required field or parameter is missing, empty, or out of range.
    #[error("validation error: {0}")]
    Validation(String),

    /// The embedding index cannot be reached or failed an operation.
    #[error("store unavailable: {source}")]
    StoreUnavailable {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The embedding adapter failed to produce vectors.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Configuration errors detected at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// A remote gateway answered with a non-success status.
    #[error("gateway returned {status}: {message}")]
    Gateway { status: u16, message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RecallError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        RecallError::Validation(message.into())
    }

    /// Wraps any error as a store-unavailable failure.
    pub fn store_unavailable<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        RecallError::StoreUnavailable {
            source: source.into(),
        }
    }

    /// Returns true for errors caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(self, RecallError::Validation(_))
    }
}
