// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message memory over an [`EmbeddingIndex`].
//!
//! Each message is stored once, keyed by its id, in the collection of its
//! channel root. The message content is the embedded document; the remaining
//! fields travel as metadata and are used to rebuild the message on search.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use recall_core::types::{AddBatch, Metadata};
use recall_core::{Collection, EmbeddingAdapter, EmbeddingIndex, Message, RecallError, Scalar};

use crate::partition::collection_name;

const KEY_AUTHOR: &str = "author";
const KEY_CHANNEL_ID: &str = "channelId";
const KEY_TIMESTAMP: &str = "timestamp";
const KEY_SEQUENCE: &str = "sequence";

/// Result of a [`MemoryStore::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The message was written.
    Inserted,
    /// A message with the same id already existed; nothing changed.
    Duplicate,
}

impl PutOutcome {
    fn as_str(self) -> &'static str {
        match self {
            PutOutcome::Inserted => "inserted",
            PutOutcome::Duplicate => "duplicate",
        }
    }
}

/// Channel-partitioned message store.
pub struct MemoryStore {
    index: Arc<dyn EmbeddingIndex>,
    embedder: Arc<dyn EmbeddingAdapter>,
    collections: DashMap<String, Arc<dyn Collection>>,
}

impl MemoryStore {
    /// Build a store over an initialized index. New collections are bound to
    /// `embedder`.
    pub fn new(index: Arc<dyn EmbeddingIndex>, embedder: Arc<dyn EmbeddingAdapter>) -> Self {
        Self {
            index,
            embedder,
            collections: DashMap::new(),
        }
    }

    /// The index this store writes to.
    pub fn index(&self) -> &Arc<dyn EmbeddingIndex> {
        &self.index
    }

    async fn collection_for(&self, channel_id: &str) -> Result<Arc<dyn Collection>, RecallError> {
        let name = collection_name(channel_id);
        if let Some(cached) = self.collections.get(&name) {
            return Ok(cached.clone());
        }
        let collection = self
            .index
            .get_or_create_collection(&name, self.embedder.clone())
            .await?;
        self.collections.insert(name, collection.clone());
        Ok(collection)
    }

    /// Store `message` unless its id is already present in the channel's
    /// collection. Storing the same message twice is a no-op.
    pub async fn put(&self, message: &Message) -> Result<PutOutcome, RecallError> {
        require_non_empty("id", &message.id)?;
        require_non_empty("channelId", &message.channel_id)?;
        require_non_empty("content", &message.content)?;

        let collection = self.collection_for(&message.channel_id).await?;

        let existing = collection.get(std::slice::from_ref(&message.id)).await?;
        let outcome = if existing.ids.is_empty() {
            collection
                .add(AddBatch::single(
                    message.id.clone(),
                    message.content.clone(),
                    message_metadata(message),
                ))
                .await?;
            PutOutcome::Inserted
        } else {
            PutOutcome::Duplicate
        };

        metrics::counter!("recall_puts_total", "outcome" => outcome.as_str()).increment(1);
        debug!(
            id = %message.id,
            channel = %message.channel_id,
            collection = collection.name(),
            outcome = outcome.as_str(),
            "message stored"
        );
        Ok(outcome)
    }

    /// Up to `limit` messages from the channel's collection, most similar to
    /// `query` first. An unknown channel yields an empty list.
    pub async fn search(
        &self,
        channel_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Message>, RecallError> {
        require_non_empty("channelId", channel_id)?;
        if limit == 0 {
            return Err(RecallError::validation("limit must be a positive integer"));
        }

        let collection = self.collection_for(channel_id).await?;
        let result = collection.query(&[query.to_string()], limit).await?;
        metrics::counter!("recall_searches_total").increment(1);

        let ids = result.ids.into_iter().next().unwrap_or_default();
        let mut documents = result
            .documents
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default()
            .into_iter();
        let mut metadatas = result
            .metadatas
            .and_then(|m| m.into_iter().next())
            .unwrap_or_default()
            .into_iter();

        let mut messages = Vec::with_capacity(ids.len().min(limit));
        for id in ids {
            let document = documents.next().flatten();
            let metadata = metadatas.next().flatten();
            match rebuild_message(&id, document, metadata) {
                Ok(message) => messages.push(message),
                Err(reason) => {
                    warn!(id = %id, collection = collection.name(), reason, "dropping malformed hit");
                    metrics::counter!("recall_search_hits_dropped_total").increment(1);
                }
            }
            if messages.len() == limit {
                break;
            }
        }

        debug!(
            channel = channel_id,
            collection = collection.name(),
            hits = messages.len(),
            "search complete"
        );
        Ok(messages)
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), RecallError> {
    if value.is_empty() {
        Err(RecallError::validation(format!("'{field}' must not be empty")))
    } else {
        Ok(())
    }
}

fn message_metadata(message: &Message) -> Metadata {
    Metadata::from([
        (KEY_AUTHOR.to_string(), Scalar::from(message.author.as_str())),
        (KEY_CHANNEL_ID.to_string(), Scalar::from(message.channel_id.as_str())),
        (KEY_TIMESTAMP.to_string(), message.timestamp.clone()),
        (KEY_SEQUENCE.to_string(), message.sequence.clone()),
    ])
}

fn rebuild_message(
    id: &str,
    document: Option<String>,
    metadata: Option<Metadata>,
) -> Result<Message, &'static str> {
    let content = document.ok_or("missing document")?;
    let mut metadata = metadata.ok_or("missing metadata")?;
    let mut take = |key: &str| metadata.remove(key);

    let author = take(KEY_AUTHOR).ok_or("missing author")?;
    let channel_id = take(KEY_CHANNEL_ID).ok_or("missing channelId")?;
    let timestamp = take(KEY_TIMESTAMP).ok_or("missing timestamp")?;
    let sequence = take(KEY_SEQUENCE).ok_or("missing sequence")?;

    Ok(Message {
        id: id.to_string(),
        author: into_text(author),
        content,
        timestamp,
        channel_id: into_text(channel_id),
        sequence,
    })
}

fn into_text(value: Scalar) -> String {
    match value {
        Scalar::Text(s) => s,
        other => other.to_string(),
    }
}
