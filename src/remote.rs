//! HTTP client for the remote advisor backend
//!
//! Speaks the backend contract (`GET /api/health`, `POST /api/chat`) over
//! JSON. Uses a long-lived reqwest::Client for connection pooling; every
//! call carries an explicit per-request deadline.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::error::AdvisorError;
use crate::models::Message;

//
// ================= Wire Types =================
//

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub user_input: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conversation_history: Vec<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub demo_mode: Option<bool>,
    #[serde(default)]
    pub market_data_included: Option<bool>,
    #[serde(default)]
    pub sentiment_analysis: Option<SentimentAnalysis>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentimentAnalysis {
    pub sentiment: String,
}

//
// ================= Backend Seam =================
//

/// The remote advisor service as seen by the core. The dispatcher and the
/// connectivity monitor only depend on this trait; production wires in
/// [`BackendClient`], tests wire in a scripted mock.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn health(&self) -> crate::Result<HealthStatus>;
    async fn chat(&self, request: &ChatRequest) -> crate::Result<ChatReply>;
}

//
// ================= Reqwest Implementation =================
//

/// Reusable backend client (connection-pooled)
pub struct BackendClient {
    client: Client,
    base_url: String,
    probe_timeout: Duration,
    chat_timeout: Duration,
}

impl BackendClient {
    pub fn new(
        base_url: impl Into<String>,
        probe_timeout: Duration,
        chat_timeout: Duration,
    ) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            probe_timeout,
            chat_timeout,
        })
    }
}

#[async_trait]
impl ChatBackend for BackendClient {
    async fn health(&self) -> crate::Result<HealthStatus> {
        let url = format!("{}/api/health", self.base_url);
        debug!(url = %url, "Probing backend health");

        let response = self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AdvisorError::BackendStatus(response.status()));
        }

        response.json::<HealthStatus>().await.map_err(|e| {
            AdvisorError::MalformedPayload(format!("health payload: {}", e))
        })
    }

    async fn chat(&self, request: &ChatRequest) -> crate::Result<ChatReply> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(url = %url, user_id = %request.user_id, "Sending chat request");

        let response = self
            .client
            .post(&url)
            .timeout(self.chat_timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Backend chat request failed: {}", e);
                AdvisorError::from(e)
            })?;

        if !response.status().is_success() {
            return Err(AdvisorError::BackendStatus(response.status()));
        }

        response.json::<ChatReply>().await.map_err(|e| {
            error!("Failed to parse backend chat response: {}", e);
            AdvisorError::MalformedPayload(format!("chat payload: {}", e))
        })
    }
}

//
// ================= Test Double =================
//
