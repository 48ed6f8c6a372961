// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`EmbeddingIndex`] and [`Collection`] traits.
//!
//! Every collection lives in the same database file. Documents carry their
//! embedding as a little-endian f32 BLOB and are ranked by brute-force cosine
//! similarity at query time.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use rusqlite::OptionalExtension;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use recall_config::model::StorageConfig;
use recall_core::types::{
    AddBatch, AdapterType, EmbeddingInput, GetResult, HealthStatus, Metadata, QueryResult,
};
use recall_core::{Collection, EmbeddingAdapter, EmbeddingIndex, PluginAdapter, RecallError};

use crate::database::{Database, map_tr_err};
use crate::similarity::{blob_to_vec, cosine_similarity, vec_to_blob};

/// Path value that selects a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// SQLite-backed embedding index.
///
/// The database is opened by [`EmbeddingIndex::initialize`]; collection
/// handles are cached per name once created.
pub struct SqliteIndex {
    config: StorageConfig,
    db: OnceCell<Database>,
    collections: DashMap<String, Arc<SqliteCollection>>,
}

impl SqliteIndex {
    /// Create an index for the given storage settings without opening it.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
            collections: DashMap::new(),
        }
    }

    fn db(&self) -> Result<&Database, RecallError> {
        self.db
            .get()
            .ok_or_else(|| RecallError::store_unavailable("index not initialized"))
    }
}

#[async_trait]
impl PluginAdapter for SqliteIndex {
    fn name(&self) -> &str {
        "sqlite-index"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Index
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        let Some(db) = self.db.get() else {
            return Ok(HealthStatus::Unhealthy("index not initialized".into()));
        };
        let probe = db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await;
        Ok(match probe {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        if self.db.get().is_some() {
            self.close().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingIndex for SqliteIndex {
    async fn initialize(&self) -> Result<(), RecallError> {
        let path = self.config.database_path.as_str();
        let db = if path == IN_MEMORY_PATH {
            Database::open_in_memory().await?
        } else {
            Database::open(path, self.config.wal_mode).await?
        };
        self.db
            .set(db)
            .map_err(|_| RecallError::store_unavailable("index already initialized"))?;
        debug!(path, "sqlite index initialized");
        Ok(())
    }

    async fn get_or_create_collection(
        &self,
        name: &str,
        embedder: Arc<dyn EmbeddingAdapter>,
    ) -> Result<Arc<dyn Collection>, RecallError> {
        if let Some(existing) = self.collections.get(name) {
            let existing: Arc<dyn Collection> = existing.clone();
            return Ok(existing);
        }

        let db = self.db()?.clone();
        let owned = name.to_string();
        let model = embedder.model_id().to_string();
        let dims = embedder.dimensions() as i64;

        let (created, recorded_model, recorded_dims) = db
            .connection()
            .call(move |conn| -> Result<(bool, String, i64), rusqlite::Error> {
                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO collections (name, embedding_model, dimensions) \
                     VALUES (?1, ?2, ?3)",
                    rusqlite::params![owned, model, dims],
                )?;
                let (recorded_model, recorded_dims) = conn.query_row(
                    "SELECT embedding_model, dimensions FROM collections WHERE name = ?1",
                    rusqlite::params![owned],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;
                Ok((inserted == 1, recorded_model, recorded_dims))
            })
            .await
            .map_err(map_tr_err)?;

        // Vectors of another width all score zero against the query.
        if recorded_dims != dims {
            return Err(RecallError::Config(format!(
                "collection {name} stores {recorded_dims}-dimensional embeddings \
                 ({recorded_model}) but the embedder produces {dims} ({})",
                embedder.model_id()
            )));
        }
        if recorded_model != embedder.model_id() {
            warn!(
                collection = name,
                recorded = %recorded_model,
                current = embedder.model_id(),
                "collection was created with a different embedding model"
            );
        }
        if created {
            debug!(collection = name, model = embedder.model_id(), "collection created");
        }
        metrics::counter!("recall_collections_opened_total").increment(1);

        let collection: Arc<dyn Collection> = self
            .collections
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(SqliteCollection {
                    name: name.to_string(),
                    db,
                    embedder,
                })
            })
            .clone();
        Ok(collection)
    }

    async fn close(&self) -> Result<(), RecallError> {
        self.db()?.checkpoint().await?;
        debug!("sqlite index closed, WAL checkpoint complete");
        Ok(())
    }
}

/// One named collection inside a [`SqliteIndex`].
pub struct SqliteCollection {
    name: String,
    db: Database,
    embedder: Arc<dyn EmbeddingAdapter>,
}

/// A stored row loaded for ranking.
struct StoredDocument {
    id: String,
    document: Option<String>,
    metadata: Option<String>,
    embedding: Vec<f32>,
}

impl SqliteCollection {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, RecallError> {
        let expected = texts.len();
        let output = self.embedder.embed(EmbeddingInput { texts }).await?;
        if output.embeddings.len() != expected {
            return Err(RecallError::Embedding(format!(
                "embedder returned {} vectors for {expected} texts",
                output.embeddings.len()
            )));
        }
        Ok(output.embeddings)
    }

    async fn load_documents(&self) -> Result<Vec<StoredDocument>, RecallError> {
        let name = self.name.clone();
        self.db
            .connection()
            .call(move |conn| -> Result<Vec<StoredDocument>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, document, metadata, embedding FROM documents \
                     WHERE collection = ?1 ORDER BY rowid",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![name], |row| {
                        let blob: Vec<u8> = row.get(3)?;
                        Ok(StoredDocument {
                            id: row.get(0)?,
                            document: row.get(1)?,
                            metadata: row.get(2)?,
                            embedding: blob_to_vec(&blob),
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)
    }

    fn parse_metadata(&self, id: &str, raw: Option<&str>) -> Option<Metadata> {
        let raw = raw?;
        match serde_json::from_str(raw) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!(collection = %self.name, id, error = %e, "unreadable document metadata");
                None
            }
        }
    }
}

#[async_trait]
impl Collection for SqliteCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, ids: &[String]) -> Result<GetResult, RecallError> {
        if ids.is_empty() {
            return Ok(GetResult::default());
        }

        let name = self.name.clone();
        let wanted = ids.to_vec();
        let present: HashSet<String> = self
            .db
            .connection()
            .call(move |conn| -> Result<HashSet<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT id FROM documents WHERE collection = ?1 AND id = ?2",
                )?;
                let mut found = HashSet::new();
                for id in wanted {
                    let hit: Option<String> = stmt
                        .query_row(rusqlite::params![name, id], |row| row.get(0))
                        .optional()?;
                    if let Some(hit) = hit {
                        found.insert(hit);
                    }
                }
                Ok(found)
            })
            .await
            .map_err(map_tr_err)?;

        Ok(GetResult {
            ids: ids.iter().filter(|id| present.contains(*id)).cloned().collect(),
        })
    }

    async fn add(&self, batch: AddBatch) -> Result<(), RecallError> {
        if batch.documents.len() != batch.ids.len() || batch.metadatas.len() != batch.ids.len() {
            return Err(RecallError::validation(format!(
                "batch columns differ in length: {} ids, {} documents, {} metadatas",
                batch.ids.len(),
                batch.documents.len(),
                batch.metadatas.len()
            )));
        }
        if batch.is_empty() {
            return Ok(());
        }

        let embeddings = self.embed(batch.documents.clone()).await?;
        let metadatas = batch
            .metadatas
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RecallError::Internal(format!("failed to encode metadata: {e}")))?;

        let name = self.name.clone();
        let AddBatch { ids, documents, .. } = batch;
        let inserted = self
            .db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                let tx = conn.transaction()?;
                let mut inserted = 0;
                {
                    let mut stmt = tx.prepare(
                        "INSERT OR IGNORE INTO documents \
                         (collection, id, document, metadata, embedding) \
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                    )?;
                    for (((id, document), metadata), embedding) in
                        ids.iter().zip(&documents).zip(&metadatas).zip(&embeddings)
                    {
                        inserted += stmt.execute(rusqlite::params![
                            name,
                            id,
                            document,
                            metadata,
                            vec_to_blob(embedding)
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(inserted)
            })
            .await
            .map_err(map_tr_err)?;

        debug!(collection = %self.name, inserted, "documents added");
        Ok(())
    }

    async fn query(
        &self,
        query_texts: &[String],
        n_results: usize,
    ) -> Result<QueryResult, RecallError> {
        let vectors = self.embed(query_texts.to_vec()).await?;
        let stored = self.load_documents().await?;

        let mut result = QueryResult {
            ids: Vec::with_capacity(vectors.len()),
            documents: Some(Vec::with_capacity(vectors.len())),
            metadatas: Some(Vec::with_capacity(vectors.len())),
            distances: Some(Vec::with_capacity(vectors.len())),
        };

        for vector in &vectors {
            let mut scored: Vec<(usize, f32)> = stored
                .iter()
                .enumerate()
                .map(|(i, doc)| (i, cosine_similarity(vector, &doc.embedding)))
                .collect();
            // Stable sort: equal scores keep insertion order.
            scored.sort_by(|a, b| b.1.total_cmp(&a.1));
            scored.truncate(n_results);

            let mut ids = Vec::with_capacity(scored.len());
            let mut documents = Vec::with_capacity(scored.len());
            let mut metadatas = Vec::with_capacity(scored.len());
            let mut distances = Vec::with_capacity(scored.len());
            for (i, score) in scored {
                let doc = &stored[i];
                ids.push(doc.id.clone());
                documents.push(doc.document.clone());
                metadatas.push(self.parse_metadata(&doc.id, doc.metadata.as_deref()));
                distances.push(1.0 - score);
            }

            result.ids.push(ids);
            if let Some(d) = result.documents.as_mut() {
                d.push(documents);
            }
            if let Some(m) = result.metadatas.as_mut() {
                m.push(metadatas);
            }
            if let Some(d) = result.distances.as_mut() {
                d.push(distances);
            }
        }

        Ok(result)
    }

    async fn count(&self) -> Result<usize, RecallError> {
        let name = self.name.clone();
        let count = self
            .db
            .connection()
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM documents WHERE collection = ?1",
                    rusqlite::params![name],
                    |row| row.get(0),
                )
            })
            .await
            .map_err(map_tr_err)?;
        Ok(count as usize)
    }
}
