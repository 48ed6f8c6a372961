// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding index for the Recall memory service.
//!
//! [`SqliteIndex`] keeps named collections of documents, metadata, and
//! embeddings in one SQLite file. [`HashingEmbedder`] is the default local
//! embedder; the `onnx` feature adds [`OnnxEmbedder`] running
//! all-MiniLM-L6-v2.

pub mod database;
pub mod hashing;
pub mod migrations;
pub mod similarity;
pub mod sqlite;

#[cfg(feature = "onnx")]
pub mod embedder;
#[cfg(feature = "onnx")]
pub mod model_manager;

pub use database::Database;
pub use hashing::HashingEmbedder;
pub use sqlite::{IN_MEMORY_PATH, SqliteCollection, SqliteIndex};

#[cfg(feature = "onnx")]
pub use embedder::OnnxEmbedder;
#[cfg(feature = "onnx")]
pub use model_manager::ModelManager;
