// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface of the Recall memory service.
//!
//! The server exposes `POST /add`, `GET /query`, and `GET /health` over a
//! [`MemoryStore`](recall_memory::MemoryStore). [`GatewayClient`] is the
//! matching reqwest client.

pub mod client;
pub mod error;
pub mod handlers;
pub mod server;

pub use client::GatewayClient;
pub use error::ApiError;
pub use server::{GatewayState, HealthState, router, serve, start_server};
