// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding adapter.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use recall_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use recall_core::{EmbeddingAdapter, PluginAdapter, RecallError};

/// Embedder producing fixed-width vectors whose first component is the text
/// length. Counts the texts it has embedded.
pub struct MockEmbedder {
    dimensions: usize,
    embedded: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            embedded: AtomicUsize::new(0),
        }
    }

    /// Number of texts embedded so far.
    pub fn embedded_count(&self) -> usize {
        self.embedded.load(Ordering::SeqCst)
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(8)
    }
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    fn model_id(&self) -> &str {
        "mock-embedder"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, RecallError> {
        self.embedded.fetch_add(input.texts.len(), Ordering::SeqCst);
        let embeddings = input
            .texts
            .iter()
            .map(|text| {
                let mut v = vec![0.0; self.dimensions];
                if let Some(first) = v.first_mut() {
                    *first = text.len() as f32;
                }
                v
            })
            .collect();
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.dimensions,
        })
    }
}
