// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./recall.toml` > `~/.config/recall/recall.toml` > `/etc/recall/recall.toml`
//! with environment variable overrides via `RECALL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RecallConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/recall/recall.toml` (system-wide)
/// 3. `~/.config/recall/recall.toml` (user XDG config)
/// 4. `./recall.toml` (local directory)
/// 5. `RECALL_*` environment variables
pub fn load_config() -> Result<RecallConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<RecallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecallConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RecallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecallConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RecallConfig::default()))
        .merge(Toml::file("/etc/recall/recall.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("recall/recall.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("recall.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `RECALL_STORAGE_DATABASE_PATH` must map to
/// `storage.database_path`, not `storage.database.path`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("RECALL_").map(|key| {
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("embedding_", "embedding.", 1)
            .replacen("search_", "search.", 1)
            .replacen("logging_", "logging.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_map_to_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("RECALL_SERVER_PORT", "9100");
            jail.set_env("RECALL_STORAGE_DATABASE_PATH", "/tmp/recall-env.db");
            jail.set_env("RECALL_SEARCH_MAX_LIMIT", "25");
            jail.set_env("RECALL_LOGGING_LEVEL", "debug");

            let config: RecallConfig = Figment::new()
                .merge(Serialized::defaults(RecallConfig::default()))
                .merge(env_provider())
                .extract()?;

            assert_eq!(config.server.port, 9100);
            assert_eq!(config.storage.database_path, "/tmp/recall-env.db");
            assert_eq!(config.search.max_limit, 25);
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn env_overrides_win_over_local_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("recall.toml", "[server]\nport = 8123\n")?;
            jail.set_env("RECALL_SERVER_PORT", "9200");
            jail.set_env("RECALL_EMBEDDING_DIMENSIONS", "64");
            let config = load_config()?;
            assert_eq!(config.server.port, 9200);
            assert_eq!(config.embedding.dimensions, 64);
            Ok(())
        });
    }

    #[test]
    fn local_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "recall.toml",
                r#"
[server]
port = 8123
"#,
            )?;
            let config = load_config()?;
            assert_eq!(config.server.port, 8123);
            assert_eq!(config.server.host, "127.0.0.1");
            Ok(())
        });
    }

    #[test]
    fn explicit_path_is_loaded() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[embedding]\ndimensions = 64\n")?;
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.embedding.dimensions, 64);
            Ok(())
        });
    }
}
