// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests over the real SQLite index and hashing embedder.
//!
//! Each test opens its own database in a temp directory, so tests are
//! independent and order-insensitive.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use recall_config::model::{SearchConfig, StorageConfig};
use recall_core::{EmbeddingIndex, Message, Scalar};
use recall_gateway::{GatewayClient, GatewayState, router, serve};
use recall_index::{HashingEmbedder, SqliteIndex};
use recall_memory::{MemoryStore, collection_name};
use recall_test_utils::sample_message;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

struct Harness {
    dir: TempDir,
    index: Arc<SqliteIndex>,
    store: Arc<MemoryStore>,
}

impl Harness {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(SqliteIndex::new(StorageConfig {
            database_path: dir.path().join("recall.db").display().to_string(),
            wal_mode: true,
        }));
        index.initialize().await.unwrap();
        let embedder = Arc::new(HashingEmbedder::new(1024).unwrap());
        let store = Arc::new(MemoryStore::new(index.clone(), embedder));
        Self {
            dir,
            index,
            store,
        }
    }

    fn app(&self) -> axum::Router {
        router(
            GatewayState::new(self.store.clone(), SearchConfig::default()),
            None,
        )
    }
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post_message(app: &axum::Router, message: &Message) -> StatusCode {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/add")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(message).unwrap()))
        .unwrap();
    send(app, request).await.0
}

async fn query(app: &axum::Router, uri: &str) -> Vec<Message> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    serde_json::from_value(json["messages"].clone()).unwrap()
}

// ---- The hello/goodbye scenario ----

#[tokio::test]
async fn hello_scenario_over_http() {
    let harness = Harness::new().await;
    let app = harness.app();

    let hello = sample_message("1", "chan1", "hello world");
    let goodbye = sample_message("2", "chan1", "goodbye world");
    assert_eq!(post_message(&app, &hello).await, StatusCode::OK);
    assert_eq!(post_message(&app, &goodbye).await, StatusCode::OK);

    let hits = query(&app, "/query?q=hello&channelId=chan1&limit=1").await;
    assert_eq!(hits, vec![hello]);
}

// ---- Idempotence ----

#[tokio::test]
async fn repeated_put_stores_once() {
    let harness = Harness::new().await;
    let m = sample_message("1", "chan1", "remember the milk");
    harness.store.put(&m).await.unwrap();
    harness.store.put(&m).await.unwrap();

    let hits = harness.store.search("chan1", "remember the milk", 10).await.unwrap();
    assert_eq!(hits, vec![m]);
}

#[tokio::test]
async fn concurrent_puts_of_one_id_store_once() {
    let harness = Harness::new().await;
    let mut tasks = Vec::new();
    for _ in 0..8 {
        let store = harness.store.clone();
        tasks.push(tokio::spawn(async move {
            store.put(&sample_message("1", "chan1", "racing writers")).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let collection = harness
        .index
        .get_or_create_collection(
            &collection_name("chan1"),
            Arc::new(HashingEmbedder::new(1024).unwrap()),
        )
        .await
        .unwrap();
    assert_eq!(collection.count().await.unwrap(), 1);
}

// ---- Limits and empty channels ----

#[tokio::test]
async fn limit_is_respected() {
    let harness = Harness::new().await;
    for i in 0..12 {
        let m = sample_message(&i.to_string(), "chan1", &format!("note number {i}"));
        harness.store.put(&m).await.unwrap();
    }
    let hits = harness.store.search("chan1", "note", 3).await.unwrap();
    assert_eq!(hits.len(), 3);
}

#[tokio::test]
async fn empty_channel_search_is_empty() {
    let harness = Harness::new().await;
    let app = harness.app();
    assert!(query(&app, "/query?q=anything&channelId=fresh&limit=5").await.is_empty());
}

// ---- Partitioning ----

#[tokio::test]
async fn channels_with_different_roots_are_isolated() {
    let harness = Harness::new().await;
    harness
        .store
        .put(&sample_message("1", "alpha", "secret plans"))
        .await
        .unwrap();
    assert!(harness.store.search("beta", "secret plans", 5).await.unwrap().is_empty());
    assert_eq!(harness.store.search("alpha", "secret", 5).await.unwrap().len(), 1);
}

#[tokio::test]
async fn sub_channels_share_memory() {
    let harness = Harness::new().await;
    harness
        .store
        .put(&sample_message("1", "chan1/a", "thread one message"))
        .await
        .unwrap();
    let hits = harness.store.search("chan1/b", "thread", 5).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].channel_id, "chan1/a");
}

// ---- Round trip ----

#[tokio::test]
async fn fields_round_trip_exactly() {
    let harness = Harness::new().await;
    let app = harness.app();
    let m = Message {
        id: "abc-123".into(),
        author: "Zoë".into(),
        content: "ünïcödé and punctuation!?".into(),
        timestamp: Scalar::Text("2026-03-01T12:00:00Z".into()),
        channel_id: "guild-7/thread-9".into(),
        sequence: Scalar::Float(42.5),
    };
    assert_eq!(post_message(&app, &m).await, StatusCode::OK);
    let hits = query(&app, "/query?q=punctuation&channelId=guild-7&limit=1").await;
    assert_eq!(hits, vec![m]);
}

#[tokio::test]
async fn memory_survives_restart() {
    let harness = Harness::new().await;
    let m = sample_message("1", "chan1", "durable note");
    harness.store.put(&m).await.unwrap();
    harness.index.close().await.unwrap();

    let reopened = Arc::new(SqliteIndex::new(StorageConfig {
        database_path: harness.dir.path().join("recall.db").display().to_string(),
        wal_mode: true,
    }));
    reopened.initialize().await.unwrap();
    let store = MemoryStore::new(reopened, Arc::new(HashingEmbedder::new(1024).unwrap()));
    assert_eq!(store.search("chan1", "durable", 1).await.unwrap(), vec![m]);
}

// ---- Real socket with the client ----

#[tokio::test]
async fn client_against_running_server() {
    let harness = Harness::new().await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let server = tokio::spawn(serve(listener, harness.app(), cancel.clone()));

    let client = GatewayClient::new(&format!("http://{addr}")).unwrap();
    let m = sample_message("1", "chan1", "hello over tcp");
    client.add(&m).await.unwrap();
    assert_eq!(client.query("chan1", "hello", Some(5)).await.unwrap(), vec![m]);
    assert_eq!(client.health().await.unwrap().status, "ok");

    let err = client.query("", "hello", Some(5)).await.unwrap_err();
    assert!(matches!(err, recall_core::RecallError::Gateway { status: 400, .. }));

    cancel.cancel();
    server.await.unwrap().unwrap();
}
