//! Social post relay
//!
//! Forwards a post and its target platforms to the external posting API
//! with the configured bearer credential. The upstream answer is returned
//! as-is: its status code and its JSON body, whatever shape it has.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RelayConfig;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {status} with a non-JSON body: {detail}")]
    InvalidBody { status: u16, detail: String },
}

/// Body accepted by `POST /share` and forwarded verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRequest {
    pub post: String,
    pub platforms: Vec<String>,
}

/// What the posting service answered
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

/// Client for the external posting endpoint
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl RelayClient {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(RelayError::Client)?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Send `request` upstream. Non-2xx answers are not errors; only a failed
    /// exchange or an unparseable body is.
    pub async fn post(&self, request: &ShareRequest) -> Result<UpstreamResponse, RelayError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| RelayError::InvalidBody {
                status,
                detail: e.to_string(),
            })?
        };

        Ok(UpstreamResponse { status, body })
    }
}
