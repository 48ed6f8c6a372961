// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use recall_core::{Message, Scalar};

/// A message with `author = "alice"`, `timestamp = 1700000000` and the
/// given id, channel, and content. `sequence` is parsed from `id` when it is
/// numeric, otherwise 0.
pub fn sample_message(id: &str, channel_id: &str, content: &str) -> Message {
    Message {
        id: id.to_string(),
        author: "alice".to_string(),
        content: content.to_string(),
        timestamp: Scalar::Int(1_700_000_000),
        channel_id: channel_id.to_string(),
        sequence: Scalar::Int(id.parse().unwrap_or(0)),
    }
}
