// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Recall memory service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Recall configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecallConfig {
    /// HTTP gateway settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Embedding index storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Embedding model settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Search request limits.
    #[serde(default)]
    pub search: SearchConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on in-flight requests. `None` leaves it unbounded.
    #[serde(default)]
    pub max_concurrent_requests: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_concurrent_requests: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7020
}

impl ServerConfig {
    /// Base URL a local client would use to reach this server.
    pub fn base_url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" => "127.0.0.1",
            other => other,
        };
        format!("http://{host}:{}", self.port)
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database holding all collections.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_data_dir() -> std::path::PathBuf {
    dirs::data_dir()
        .map(|p| p.join("recall"))
        .unwrap_or_else(|| std::path::PathBuf::from("./data"))
}

fn default_database_path() -> String {
    default_data_dir().join("recall.db").display().to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Which embedding implementation backs new collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Feature-hashed bag of words. Deterministic, needs no model files.
    #[default]
    Hashing,
    /// all-MiniLM-L6-v2 via ONNX Runtime (requires the `onnx` build feature).
    Onnx,
}

/// Embedding model configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Embedding implementation.
    #[serde(default)]
    pub provider: EmbeddingProvider,

    /// Vector size for the hashing provider. The ONNX model is fixed at 384.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Directory for downloaded model files.
    #[serde(default = "default_model_dir")]
    pub model_dir: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            dimensions: default_dimensions(),
            model_dir: default_model_dir(),
        }
    }
}

fn default_dimensions() -> usize {
    1024
}

fn default_model_dir() -> String {
    default_data_dir().join("models").display().to_string()
}

/// Search request limits applied by the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Limit used when a query omits `limit`.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Requests asking for more results are clamped to this value.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> usize {
    10
}

fn default_max_limit() -> usize {
    100
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
