//! JSON-RPC over HTTP provider
//!
//! Lets the probe treat a node or wallet bridge endpoint as the legacy global
//! provider. It builds a JSON-RPC 2.0 request body, posts it, checks the HTTP
//! status and maps the reply's `result` / `error` members onto the
//! [`EthereumProvider`] contract.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{EthereumProvider, ProviderError};
use crate::constants::{HTTP_REQUEST_TIMEOUT_SECS, JSONRPC_VERSION};

/// Outbound JSON-RPC request body
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id:      u64,
    method:  &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params:  Option<Value>,
}

/// Raw JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error:  Option<JsonRpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code:    i64,
    message: String,
}

/// Provider handle backed by a JSON-RPC HTTP endpoint
#[derive(Debug)]
pub struct HttpProvider {
    url:     String,
    client:  reqwest::Client,
    timeout: Duration,
    next_id: AtomicU64,
}

impl HttpProvider {
    /// Create a provider posting to `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    /// Create a provider that posts through an existing client
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
            timeout: Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS),
            next_id: AtomicU64::new(1),
        }
    }

    /// Override the per-request transport timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint this provider posts to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build the JSON-RPC request body for one call
    fn build_request_body<'a>(&self, method: &'a str, params: Option<Value>) -> JsonRpcRequest<'a> {
        let request = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, id = request.id, url = %self.url, "json-rpc request");
        request
    }

    /// Check if the HTTP response status is successful
    fn check_status(
        &self,
        method: &str,
        response: &reqwest::Response,
    ) -> Result<(), ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        warn!(method, %status, url = %self.url, "json-rpc endpoint returned HTTP error");
        Err(ProviderError::Transport(format!(
            "HTTP error {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown error")
        )))
    }

    /// Describe a transport failure the way it will be shown in the report
    fn describe_transport_error(&self, method: &str, e: &reqwest::Error) -> ProviderError {
        warn!(method, url = %self.url, error = %e, "json-rpc request failed");

        let error_type = if e.is_timeout() {
            "Timeout"
        } else if e.is_connect() {
            "Connection failed"
        } else if e.is_request() {
            "Request error"
        } else if e.is_body() {
            "Body error"
        } else if e.is_decode() {
            "Decode error"
        } else {
            "HTTP error"
        };
        ProviderError::Transport(format!("{error_type} for {}: {e}", self.url))
    }
}

#[async_trait]
impl EthereumProvider for HttpProvider {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, ProviderError> {
        let body = self.build_request_body(method, params);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.describe_transport_error(method, &e))?;

        self.check_status(method, &response)?;

        let reply: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| self.describe_transport_error(method, &e))?;

        match reply {
            JsonRpcResponse {
                error: Some(error), ..
            } => Err(ProviderError::Rpc {
                code:    error.code,
                message: error.message,
            }),
            JsonRpcResponse { result, .. } => Ok(result.unwrap_or(Value::Null)),
        }
    }
}
