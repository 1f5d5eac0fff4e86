//! Ethereum-style provider handles
//!
//! A provider handle is anything that answers EIP-1193 `request` calls. The
//! probe only ever issues the two read-only requests `eth_chainId` and
//! `eth_accounts`.
//!
//! Handles are opaque, so their callable members cannot be discovered by
//! introspection. Instead every handle declares the [`ProviderMethod`]s it
//! implements through [`EthereumProvider::methods`].

mod http;
mod scripted;

use std::collections::BTreeSet;

use async_trait::async_trait;
pub use http::HttpProvider;
pub use scripted::{ScriptedProvider, ScriptedReply};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

use crate::constants::{METHOD_ACCOUNTS, METHOD_CHAIN_ID};

/// Callable members a provider handle may expose
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ProviderMethod {
    /// EIP-1193 `request`
    Request,
    /// Event subscription
    On,
    /// Event unsubscription
    RemoveListener,
    /// Legacy connection prompt
    Enable,
    /// Legacy synchronous send
    Send,
    /// Legacy callback send
    SendAsync,
}

/// Failure reported by a provider handle or its transport
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// JSON-RPC error object returned by the provider
    #[error("{message} (code {code})")]
    Rpc {
        /// JSON-RPC error code
        code:    i64,
        /// Provider supplied message
        message: String,
    },

    /// The request never produced a reply
    #[error("{0}")]
    Transport(String),

    /// The provider rejected the call without a JSON-RPC error object
    #[error("{0}")]
    Rejected(String),

    /// The reply did not have the expected shape
    #[error("unexpected {method} response: {details}")]
    UnexpectedResponse {
        /// Method whose reply was malformed
        method:  String,
        /// What was wrong with it
        details: String,
    },

    /// The provider does not implement the method
    #[error("method {0} is not supported")]
    Unsupported(String),
}

/// An EIP-1193 provider handle
#[async_trait]
pub trait EthereumProvider: Send + Sync {
    /// Issue a JSON-RPC style request
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, ProviderError>;

    /// Vendor flag some injected providers set (`isMetaMask`)
    fn is_metamask(&self) -> bool {
        false
    }

    /// Members this handle implements
    fn methods(&self) -> BTreeSet<ProviderMethod> {
        BTreeSet::from([ProviderMethod::Request])
    }
}

/// Request the active chain id as a hex string
///
/// # Errors
/// Returns the provider's error, or [`ProviderError::UnexpectedResponse`]
/// when the reply is neither a string nor a non-negative integer.
pub async fn request_chain_id(provider: &dyn EthereumProvider) -> Result<String, ProviderError> {
    match provider.request(METHOD_CHAIN_ID, None).await? {
        Value::String(chain_id) => Ok(chain_id),
        Value::Number(number) => number.as_u64().map(|id| format!("{id:#x}")).ok_or_else(|| {
            ProviderError::UnexpectedResponse {
                method:  METHOD_CHAIN_ID.to_string(),
                details: format!("chain id {number} is not a non-negative integer"),
            }
        }),
        other => Err(ProviderError::UnexpectedResponse {
            method:  METHOD_CHAIN_ID.to_string(),
            details: format!("expected string, got {other}"),
        }),
    }
}

/// Request the connected account list
///
/// # Errors
/// Returns the provider's error, or [`ProviderError::UnexpectedResponse`]
/// when the reply is not an array of strings.
pub async fn request_accounts(
    provider: &dyn EthereumProvider,
) -> Result<Vec<String>, ProviderError> {
    let reply = provider.request(METHOD_ACCOUNTS, None).await?;
    serde_json::from_value(reply).map_err(|e| ProviderError::UnexpectedResponse {
        method:  METHOD_ACCOUNTS.to_string(),
        details: e.to_string(),
    })
}
