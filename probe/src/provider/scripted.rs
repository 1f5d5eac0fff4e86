//! Provider handle that answers from a fixed script
//!
//! Used by page fixtures to stand in for injected wallets, and by tests to
//! drive every success and failure path of the discovery channels.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use super::{EthereumProvider, ProviderError, ProviderMethod};

/// Scripted outcome for one method, written as `{"result": ...}` or `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptedReply {
    /// Resolve with this value
    Result(Value),
    /// Reject with this message
    Error(String),
}

/// Provider whose replies are fixed up front
#[derive(Debug)]
pub struct ScriptedProvider {
    replies:     HashMap<String, ScriptedReply>,
    is_metamask: bool,
    methods:     BTreeSet<ProviderMethod>,
    delay:       Duration,
    calls:       Mutex<Vec<String>>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedProvider {
    /// Create a provider that only declares `request` and rejects every method
    pub fn new() -> Self {
        Self {
            replies:     HashMap::new(),
            is_metamask: false,
            methods:     BTreeSet::from([ProviderMethod::Request]),
            delay:       Duration::ZERO,
            calls:       Mutex::new(Vec::new()),
        }
    }

    /// Script the reply for `method`
    #[must_use]
    pub fn with_reply(mut self, method: impl Into<String>, reply: ScriptedReply) -> Self {
        self.replies.insert(method.into(), reply);
        self
    }

    /// Script a successful reply for `method`
    #[must_use]
    pub fn with_result(self, method: impl Into<String>, value: Value) -> Self {
        self.with_reply(method, ScriptedReply::Result(value))
    }

    /// Script a rejection for `method`
    #[must_use]
    pub fn with_error(self, method: impl Into<String>, message: impl Into<String>) -> Self {
        self.with_reply(method, ScriptedReply::Error(message.into()))
    }

    /// Set the `isMetaMask` vendor flag
    #[must_use]
    pub fn with_metamask_flag(mut self, is_metamask: bool) -> Self {
        self.is_metamask = is_metamask;
        self
    }

    /// Replace the declared member set
    #[must_use]
    pub fn with_methods(mut self, methods: impl IntoIterator<Item = ProviderMethod>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Delay every reply by `delay`
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Methods requested so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EthereumProvider for ScriptedProvider {
    async fn request(&self, method: &str, _params: Option<Value>) -> Result<Value, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(method.to_string());
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        trace!(method, "scripted provider request");

        match self.replies.get(method) {
            Some(ScriptedReply::Result(value)) => Ok(value.clone()),
            Some(ScriptedReply::Error(message)) => Err(ProviderError::Rejected(message.clone())),
            None => Err(ProviderError::Unsupported(method.to_string())),
        }
    }

    fn is_metamask(&self) -> bool {
        self.is_metamask
    }

    fn methods(&self) -> BTreeSet<ProviderMethod> {
        self.methods.clone()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn replies_deserialize_from_tagged_objects() {
        let result: Option<ScriptedReply> = serde_json::from_value(json!({"result": "0x1"})).ok();
        assert_eq!(result, Some(ScriptedReply::Result(json!("0x1"))));

        let error: Option<ScriptedReply> =
            serde_json::from_value(json!({"error": "User rejected"})).ok();
        assert_eq!(error, Some(ScriptedReply::Error("User rejected".to_string())));
    }

    #[tokio::test]
    async fn unscripted_methods_are_unsupported_and_recorded() {
        let provider = ScriptedProvider::new().with_error("eth_chainId", "boom");

        assert_eq!(
            provider.request("eth_chainId", None).await,
            Err(ProviderError::Rejected("boom".to_string()))
        );
        assert_eq!(
            provider.request("eth_accounts", None).await,
            Err(ProviderError::Unsupported("eth_accounts".to_string()))
        );
        assert_eq!(provider.calls(), vec!["eth_chainId", "eth_accounts"]);
    }
}
