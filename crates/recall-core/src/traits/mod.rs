// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions at the seams of the memory service.
//!
//! Adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod embedding;
pub mod index;

pub use adapter::PluginAdapter;
pub use embedding::EmbeddingAdapter;
pub use index::{Collection, EmbeddingIndex};
