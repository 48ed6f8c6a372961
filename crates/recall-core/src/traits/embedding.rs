// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::RecallError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EmbeddingInput, EmbeddingOutput};

/// Adapter for turning text into vectors.
///
/// A collection is bound to one embedding adapter when it is created; the
/// adapter's [`model_id`](EmbeddingAdapter::model_id) is recorded with it.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Stable identifier of the model and its parameters.
    fn model_id(&self) -> &str;

    /// Dimensionality of the produced vectors.
    fn dimensions(&self) -> usize;

    /// Generates embeddings for the given input.
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, RecallError>;
}
