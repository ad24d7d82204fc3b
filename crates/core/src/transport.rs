//! Outbound wire protocol: one JSON POST per user turn.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Chat endpoint returned status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),
}

/// Request body sent for a user turn.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub message: String,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    /// Local responder's answer, sent along in local-responder mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

/// Delivers an outbound message and returns the raw body of a 2xx reply.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post(&self, message: &OutboundMessage) -> Result<String, TransportError>;
}

/// [`ChatTransport`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Url,
    credential: Option<String>,
    client: Client,
}

impl HttpTransport {
    pub fn new(endpoint: Url, credential: Option<String>) -> Self {
        Self {
            endpoint,
            credential,
            client: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn post(&self, message: &OutboundMessage) -> Result<String, TransportError> {
        debug!(
            "Posting message {} to {}",
            message.message_id, self.endpoint
        );

        // .json() also sets Content-Type: application/json
        let mut request = self.client.post(self.endpoint.clone()).json(message);
        if let Some(key) = &self.credential {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(TransportError::Status { status, body });
        }

        let body = response.text().await?;
        debug!("Received {} bytes with status {}", body.len(), status);
        Ok(body)
    }
}
