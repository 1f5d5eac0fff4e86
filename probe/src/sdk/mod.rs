//! Host SDK boundary
//!
//! The host application exposes an SDK object with a readiness handshake, a
//! context describing the launch (user, cast, client), arbitrary read-only
//! properties, and an optional wallet capability. The probe consumes all of
//! them as black boxes through [`HostSdk`] and [`SdkWallet`].

mod scripted;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
pub use scripted::{ScriptedSdk, ScriptedWallet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

use crate::provider::{EthereumProvider, ProviderError};

/// Callable members an SDK wallet may expose
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
pub enum WalletMethod {
    /// Accessor returning an Ethereum provider handle
    GetEthereumProvider,
    /// Accessor returning a Solana provider handle; never invoked
    GetSolanaProvider,
}

/// Failure reported by the host SDK
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SdkError {
    /// The readiness handshake did not complete
    #[error("{0}")]
    NotReady(String),
    /// The launch context could not be read
    #[error("{0}")]
    Context(String),
    /// A property could not be read
    #[error("{0}")]
    Property(String),
}

/// Farcaster user that launched the mini app
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    /// Farcaster id
    pub fid:          u64,
    /// Username, when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username:     Option<String>,
    /// Display name, when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Profile picture url, when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pfp_url:      Option<String>,
    /// Members this probe does not interpret
    #[serde(flatten)]
    pub extra:        Map<String, Value>,
}

/// Client application hosting the mini app
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContext {
    /// Farcaster id of the client
    pub client_fid: u64,
    /// Whether the user added the mini app
    #[serde(default)]
    pub added:      bool,
    /// Members this probe does not interpret
    #[serde(flatten)]
    pub extra:      Map<String, Value>,
}

/// Launch context reported by the host SDK
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkContext {
    /// Launching user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user:   Option<UserContext>,
    /// Cast the mini app was launched from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast:   Option<Value>,
    /// Hosting client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientContext>,
    /// Members this probe does not interpret
    #[serde(flatten)]
    pub extra:  Map<String, Value>,
}

/// Wallet capability object exposed by the host SDK
#[async_trait]
pub trait SdkWallet: Send + Sync {
    /// Members this wallet implements
    fn methods(&self) -> BTreeSet<WalletMethod>;

    /// Invoke the Ethereum provider accessor
    ///
    /// `Ok(None)` means the accessor ran but handed out no provider. Only
    /// called when [`SdkWallet::methods`] declares
    /// [`WalletMethod::GetEthereumProvider`].
    async fn get_ethereum_provider(
        &self,
    ) -> Result<Option<Arc<dyn EthereumProvider>>, ProviderError>;
}

/// Host SDK object
#[async_trait]
pub trait HostSdk: Send + Sync {
    /// Readiness handshake with the host application
    async fn ready(&self) -> Result<(), SdkError>;

    /// Launch context, if the host provided one
    fn context(&self) -> Result<Option<SdkContext>, SdkError>;

    /// Non-callable SDK members, each read independently
    fn properties(&self) -> BTreeMap<String, Result<Value, SdkError>>;

    /// Wallet capability, if the host exposes one
    fn wallet(&self) -> Option<Arc<dyn SdkWallet>>;
}
