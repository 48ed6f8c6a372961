// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! reqwest client for a running gateway.

use recall_core::{Message, RecallError};
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::handlers::{HealthResponse, QueryResponse};

/// Talks to `POST /add`, `GET /query`, and `GET /health`.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: Url,
    http: Client,
}

impl GatewayClient {
    /// Create a client for the gateway at `base_url`, e.g. `http://127.0.0.1:7020`.
    pub fn new(base_url: &str) -> Result<Self, RecallError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| RecallError::Config(format!("invalid gateway url {base_url}: {e}")))?;
        // Endpoints are joined relative to the base, which drops a last
        // segment not ending in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            http: Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RecallError> {
        self.base_url
            .join(path)
            .map_err(|e| RecallError::Config(format!("invalid gateway path {path}: {e}")))
    }

    /// Store a message.
    pub async fn add(&self, message: &Message) -> Result<(), RecallError> {
        let response = self
            .http
            .post(self.endpoint("add")?)
            .json(message)
            .send()
            .await
            .map_err(RecallError::store_unavailable)?;
        check(response).await?;
        debug!(id = %message.id, "message sent to gateway");
        Ok(())
    }

    /// Search a channel. `limit = None` lets the server pick its default.
    pub async fn query(
        &self,
        channel_id: &str,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, RecallError> {
        let mut url = self.endpoint("query")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("channelId", channel_id);
            pairs.append_pair("q", query);
            if let Some(limit) = limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(RecallError::store_unavailable)?;
        let body: QueryResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| RecallError::Internal(format!("unreadable query response: {e}")))?;
        Ok(body.messages)
    }

    /// Fetch the gateway's health report.
    pub async fn health(&self) -> Result<HealthResponse, RecallError> {
        let response = self
            .http
            .get(self.endpoint("health")?)
            .send()
            .await
            .map_err(RecallError::store_unavailable)?;
        check(response)
            .await?
            .json()
            .await
            .map_err(|e| RecallError::Internal(format!("unreadable health response: {e}")))
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, RecallError> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(RecallError::Gateway {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_test_utils::sample_message;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            GatewayClient::new("not a url"),
            Err(RecallError::Config(_))
        ));
    }

    #[tokio::test]
    async fn add_posts_camel_case_json() {
        let server = MockServer::start().await;
        let m = sample_message("1", "chan1", "hello");
        Mock::given(method("POST"))
            .and(path("/add"))
            .and(body_json(serde_json::json!({
                "id": "1",
                "author": "alice",
                "content": "hello",
                "timestamp": 1_700_000_000,
                "channelId": "chan1",
                "sequence": 1
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri()).unwrap();
        client.add(&m).await.unwrap();
    }

    #[tokio::test]
    async fn base_url_path_prefix_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/recall/add"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = GatewayClient::new(&format!("{}/recall", server.uri())).unwrap();
        client.add(&sample_message("1", "chan1", "hello")).await.unwrap();
    }

    #[tokio::test]
    async fn query_sends_params_and_parses_messages() {
        let server = MockServer::start().await;
        let m = sample_message("2", "chan1/a", "goodbye world");
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("channelId", "chan1/a"))
            .and(query_param("q", "good bye&more"))
            .and(query_param("limit", "3"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "messages": [m] })),
            )
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri()).unwrap();
        let messages = client.query("chan1/a", "good bye&more", Some(3)).await.unwrap();
        assert_eq!(messages, vec![m]);
    }

    #[tokio::test]
    async fn missing_messages_key_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri()).unwrap();
        assert!(client.query("c", "q", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_200_becomes_gateway_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Missing 'q' parameter"))
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri()).unwrap();
        let err = client.query("c", "", Some(1)).await.unwrap_err();
        match err {
            RecallError::Gateway { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Missing 'q' parameter");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn health_parses_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "version": "0.1.0",
                "uptime_secs": 12
            })))
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri()).unwrap();
        let health = client.health().await.unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.uptime_secs, 12);
    }
}
