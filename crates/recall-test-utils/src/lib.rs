// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Recall.
//!
//! Provides in-memory stand-ins for the embedding index and embedder so
//! store and gateway tests run without SQLite or model files.
//!
//! # Components
//!
//! - [`MockIndex`] - In-memory index with term-overlap ranking and call counters
//! - [`FailingIndex`] - Index whose every operation reports the store unavailable
//! - [`MockEmbedder`] - Embedder that records how often it was called
//! - [`sample_message`] - Message fixture

pub mod fixtures;
pub mod mock_embedder;
pub mod mock_index;

pub use fixtures::sample_message;
pub use mock_embedder::MockEmbedder;
pub use mock_index::{FailingIndex, MockCollection, MockIndex};
