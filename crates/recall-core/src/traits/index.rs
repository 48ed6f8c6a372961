// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding index traits: a store of named, searchable collections.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RecallError;
use crate::traits::adapter::PluginAdapter;
use crate::traits::embedding::EmbeddingAdapter;
use crate::types::{AddBatch, GetResult, QueryResult};

/// A persistent index of named collections.
///
/// Implementations own their connection lifecycle: [`initialize`] must be
/// called before any collection is requested, and [`close`] flushes pending
/// state before the process exits.
///
/// [`initialize`]: EmbeddingIndex::initialize
/// [`close`]: EmbeddingIndex::close
#[async_trait]
pub trait EmbeddingIndex: PluginAdapter {
    /// Opens the underlying storage.
    async fn initialize(&self) -> Result<(), RecallError>;

    /// Returns the named collection, creating it if it does not exist.
    ///
    /// Must be idempotent under concurrent callers: two first-time requests
    /// for the same name yield the same logical collection.
    async fn get_or_create_collection(
        &self,
        name: &str,
        embedder: Arc<dyn EmbeddingAdapter>,
    ) -> Result<Arc<dyn Collection>, RecallError>;

    /// Flushes and releases the underlying storage.
    async fn close(&self) -> Result<(), RecallError>;
}

/// A named partition of (id, document, metadata) records.
#[async_trait]
pub trait Collection: Send + Sync {
    /// The collection's name inside its index.
    fn name(&self) -> &str;

    /// Returns which of `ids` are present.
    async fn get(&self, ids: &[String]) -> Result<GetResult, RecallError>;

    /// Embeds and stores a batch. Ids that already exist are left untouched.
    async fn add(&self, batch: AddBatch) -> Result<(), RecallError>;

    /// Runs one nearest-neighbour search per query text, returning up to
    /// `n_results` hits each, most similar first.
    async fn query(
        &self,
        query_texts: &[String],
        n_results: usize,
    ) -> Result<QueryResult, RecallError>;

    /// Number of records in the collection.
    async fn count(&self) -> Result<usize, RecallError>;
}
