// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory embedding index for deterministic store and gateway tests.
//!
//! [`MockCollection`] ranks documents by how many query terms they contain,
//! breaking ties by insertion order. No vectors are computed.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use recall_core::types::{AddBatch, AdapterType, GetResult, HealthStatus, Metadata, QueryResult};
use recall_core::{Collection, EmbeddingAdapter, EmbeddingIndex, PluginAdapter, RecallError};

/// Mock index holding [`MockCollection`]s by name.
#[derive(Default)]
pub struct MockIndex {
    collections: Mutex<HashMap<String, Arc<MockCollection>>>,
    create_calls: AtomicUsize,
}

impl MockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get_or_create_collection` calls seen.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// The named collection, if it has been created.
    pub async fn collection(&self, name: &str) -> Option<Arc<MockCollection>> {
        self.collections.lock().await.get(name).cloned()
    }

    /// Names of all collections created so far, sorted.
    pub async fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.lock().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get or create a collection without an embedder, for seeding raw hits.
    pub async fn seed_collection(&self, name: &str) -> Arc<MockCollection> {
        self.collections
            .lock()
            .await
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MockCollection::new(name)))
            .clone()
    }
}

#[async_trait]
impl PluginAdapter for MockIndex {
    fn name(&self) -> &str {
        "mock-index"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Index
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingIndex for MockIndex {
    async fn initialize(&self) -> Result<(), RecallError> {
        Ok(())
    }

    async fn get_or_create_collection(
        &self,
        name: &str,
        _embedder: Arc<dyn EmbeddingAdapter>,
    ) -> Result<Arc<dyn Collection>, RecallError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let collection: Arc<dyn Collection> = self.seed_collection(name).await;
        Ok(collection)
    }

    async fn close(&self) -> Result<(), RecallError> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct MockRecord {
    id: String,
    document: Option<String>,
    metadata: Option<Metadata>,
}

/// In-memory collection.
pub struct MockCollection {
    name: String,
    records: Mutex<Vec<MockRecord>>,
    add_calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl MockCollection {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            records: Mutex::new(Vec::new()),
            add_calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    /// Every query text received, in call order.
    pub async fn queries(&self) -> Vec<String> {
        self.queries.lock().await.clone()
    }

    /// Insert a record as-is, bypassing validation. Lets tests plant hits
    /// with missing documents or incomplete metadata.
    pub async fn inject_raw(
        &self,
        id: &str,
        document: Option<&str>,
        metadata: Option<Metadata>,
    ) {
        self.records.lock().await.push(MockRecord {
            id: id.to_string(),
            document: document.map(str::to_string),
            metadata,
        });
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl Collection for MockCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, ids: &[String]) -> Result<GetResult, RecallError> {
        let records = self.records.lock().await;
        let ids = ids
            .iter()
            .filter(|id| records.iter().any(|r| &r.id == *id))
            .cloned()
            .collect();
        Ok(GetResult { ids })
    }

    async fn add(&self, batch: AddBatch) -> Result<(), RecallError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().await;
        let AddBatch {
            ids,
            documents,
            metadatas,
        } = batch;
        for ((id, document), metadata) in ids.into_iter().zip(documents).zip(metadatas) {
            if records.iter().any(|r| r.id == id) {
                continue;
            }
            records.push(MockRecord {
                id,
                document: Some(document),
                metadata: Some(metadata),
            });
        }
        Ok(())
    }

    async fn query(
        &self,
        query_texts: &[String],
        n_results: usize,
    ) -> Result<QueryResult, RecallError> {
        self.queries.lock().await.extend(query_texts.iter().cloned());
        let records = self.records.lock().await;
        let mut result = QueryResult {
            documents: Some(Vec::new()),
            metadatas: Some(Vec::new()),
            distances: Some(Vec::new()),
            ..Default::default()
        };

        for text in query_texts {
            let wanted = terms(text);
            let mut scored: Vec<(usize, usize)> = records
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    let overlap = r
                        .document
                        .as_deref()
                        .map(|d| terms(d).intersection(&wanted).count())
                        .unwrap_or(0);
                    (i, overlap)
                })
                .collect();
            scored.sort_by(|a, b| b.1.cmp(&a.1));
            scored.truncate(n_results);

            result
                .ids
                .push(scored.iter().map(|(i, _)| records[*i].id.clone()).collect());
            if let Some(d) = result.documents.as_mut() {
                d.push(scored.iter().map(|(i, _)| records[*i].document.clone()).collect());
            }
            if let Some(m) = result.metadatas.as_mut() {
                m.push(scored.iter().map(|(i, _)| records[*i].metadata.clone()).collect());
            }
            if let Some(d) = result.distances.as_mut() {
                d.push(scored.iter().map(|(_, s)| 1.0 / (1.0 + *s as f32)).collect());
            }
        }

        Ok(result)
    }

    async fn count(&self) -> Result<usize, RecallError> {
        Ok(self.records.lock().await.len())
    }
}

/// Index that is permanently unavailable.
#[derive(Default)]
pub struct FailingIndex;

impl FailingIndex {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PluginAdapter for FailingIndex {
    fn name(&self) -> &str {
        "failing-index"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Index
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        Ok(HealthStatus::Unhealthy("index offline".into()))
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingIndex for FailingIndex {
    async fn initialize(&self) -> Result<(), RecallError> {
        Err(RecallError::store_unavailable("index offline"))
    }

    async fn get_or_create_collection(
        &self,
        _name: &str,
        _embedder: Arc<dyn EmbeddingAdapter>,
    ) -> Result<Arc<dyn Collection>, RecallError> {
        Err(RecallError::store_unavailable("index offline"))
    }

    async fn close(&self) -> Result<(), RecallError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockEmbedder;

    fn embedder() -> Arc<dyn EmbeddingAdapter> {
        Arc::new(MockEmbedder::default())
    }

    #[tokio::test]
    async fn ranks_by_term_overlap_then_insertion_order() {
        let index = MockIndex::new();
        let c = index.get_or_create_collection("c1", embedder()).await.unwrap();
        for (id, doc) in [("a", "red fish"), ("b", "blue fish"), ("c", "red blue fish")] {
            c.add(AddBatch::single(id, doc, Metadata::new())).await.unwrap();
        }
        let result = c.query(&["red blue".to_string()], 3).await.unwrap();
        assert_eq!(result.ids[0], vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn add_skips_existing_ids() {
        let index = MockIndex::new();
        let c = index.get_or_create_collection("c1", embedder()).await.unwrap();
        c.add(AddBatch::single("1", "one", Metadata::new())).await.unwrap();
        c.add(AddBatch::single("1", "uno", Metadata::new())).await.unwrap();
        assert_eq!(c.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn counts_create_calls() {
        let index = MockIndex::new();
        index.get_or_create_collection("c1", embedder()).await.unwrap();
        index.get_or_create_collection("c1", embedder()).await.unwrap();
        assert_eq!(index.create_calls(), 2);
        assert_eq!(index.collection_names().await, vec!["c1"]);
    }

    #[tokio::test]
    async fn failing_index_reports_unavailable() {
        let err = FailingIndex::new()
            .get_or_create_collection("c1", embedder())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RecallError::StoreUnavailable { .. }));
    }
}
