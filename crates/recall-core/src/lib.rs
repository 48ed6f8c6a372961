// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Recall memory service.
//!
//! Provides the message data model, the error taxonomy, and the adapter
//! traits (embedding index, collection, embedding adapter) that the store
//! and gateway are written against.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RecallError;
pub use types::{AdapterType, HealthStatus, Message, Metadata, Scalar};

pub use traits::{Collection, EmbeddingAdapter, EmbeddingIndex, PluginAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_embedding_adapter<T: EmbeddingAdapter>() {}
        fn _assert_embedding_index<T: EmbeddingIndex>() {}
        fn _assert_collection<T: Collection>() {}
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }
}
