// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel-scoped message memory.
//!
//! Messages are written to one collection per channel root (the part of the
//! channel id before the first `/`) and retrieved by semantic similarity
//! within that collection.

pub mod partition;
pub mod store;

pub use partition::{channel_root, collection_name};
pub use store::MemoryStore;
