// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the index, store, and gateway crates.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A metadata value attached to an indexed document.
///
/// Timestamps and sequence numbers are opaque to the store, so callers may
/// send integers, floats, or strings and get back exactly what they sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

/// Metadata mapping stored alongside each document in a collection.
pub type Metadata = BTreeMap<String, Scalar>;

/// A single stored utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Caller-supplied identifier, unique within a channel's collection.
    pub id: String,
    /// Sender of the message.
    pub author: String,
    /// Text body; this is what gets embedded and searched.
    pub content: String,
    /// Creation instant, opaque to the store.
    pub timestamp: Scalar,
    /// Raw channel identifier, including any `/` sub-scope.
    pub channel_id: String,
    /// Ordering hint within the channel, opaque to the store.
    pub sequence: Scalar,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Index,
    Embedding,
}

// --- Embedding types ---

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    /// Texts to embed, one vector per entry.
    pub texts: Vec<String>,
}

/// Output from an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    /// One vector per input text, in input order.
    pub embeddings: Vec<Vec<f32>>,
    /// Dimensionality of every vector.
    pub dimensions: usize,
}

// --- Collection types ---

/// A batch of documents for [`Collection::add`](crate::traits::Collection::add).
///
/// The three vectors are parallel: entry `i` of each belongs to the same document.
#[derive(Debug, Clone, Default)]
pub struct AddBatch {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<Metadata>,
}

impl AddBatch {
    /// A batch holding exactly one document.
    pub fn single(id: impl Into<String>, document: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            ids: vec![id.into()],
            documents: vec![document.into()],
            metadatas: vec![metadata],
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Result of an existence lookup by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetResult {
    /// The subset of requested ids present in the collection.
    pub ids: Vec<String>,
}

/// Nearest-neighbour results, nested per query text.
///
/// The outer vectors have one entry per query text. Documents and metadata
/// are optional per hit because an index may hold records without them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub ids: Vec<Vec<String>>,
    pub documents: Option<Vec<Vec<Option<String>>>>,
    pub metadatas: Option<Vec<Vec<Option<Metadata>>>>,
    pub distances: Option<Vec<Vec<f32>>>,
}
