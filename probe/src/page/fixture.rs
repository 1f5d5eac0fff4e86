//! JSON description of a simulated page

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::discovery::ProviderIdentity;
use crate::inspector::PageEnvironment;
use crate::provider::{
    EthereumProvider, HttpProvider, ProviderMethod, ScriptedProvider, ScriptedReply,
};
use crate::sdk::{ScriptedSdk, ScriptedWallet, SdkContext, WalletMethod};

/// Whole page: injected provider, announce responders, host SDK, environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageFixture {
    /// Legacy global provider, if the page has one
    pub legacy:      Option<LegacyFixture>,
    /// Providers answering `eip6963:requestProvider`
    pub responders:  Vec<ResponderFixture>,
    /// Host SDK; a page without one behaves as if opened outside a host
    pub sdk:         Option<SdkFixture>,
    /// Environment facts
    pub environment: PageEnvironment,
}

/// Legacy global provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LegacyFixture {
    /// Provider answering from a script
    Scripted(ScriptedProviderFixture),
    /// Provider forwarding to a JSON-RPC endpoint
    Http {
        /// Endpoint url
        rpc_url: String,
    },
}

impl LegacyFixture {
    pub(super) fn build(&self) -> Arc<dyn EthereumProvider> {
        match self {
            Self::Scripted(provider) => Arc::new(provider.build()),
            Self::Http { rpc_url } => Arc::new(HttpProvider::new(rpc_url.clone())),
        }
    }
}

/// Scripted provider handle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptedProviderFixture {
    /// `isMetaMask` vendor flag
    pub is_metamask: bool,
    /// Declared members; `request` only when omitted
    pub methods:     Option<BTreeSet<ProviderMethod>>,
    /// Reply per RPC method
    pub replies:     BTreeMap<String, ScriptedReply>,
    /// Delay before every reply
    pub delay_ms:    u64,
}

impl ScriptedProviderFixture {
    pub(super) fn build(&self) -> ScriptedProvider {
        let provider = self
            .replies
            .iter()
            .fold(ScriptedProvider::new(), |provider, (method, reply)| {
                provider.with_reply(method.clone(), reply.clone())
            })
            .with_metamask_flag(self.is_metamask)
            .with_delay(Duration::from_millis(self.delay_ms));

        match &self.methods {
            Some(methods) => provider.with_methods(methods.iter().copied()),
            None => provider,
        }
    }
}

/// Announce responder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponderFixture {
    /// Identity to announce; a missing uuid is generated
    pub info:     ProviderIdentity,
    /// Delay between a request and the announcement
    #[serde(default)]
    pub delay_ms: u64,
    /// Handle handed out with the announcement
    #[serde(default)]
    pub provider: ScriptedProviderFixture,
}

/// Host SDK
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkFixture {
    /// Failure message for the readiness handshake
    pub ready_error:   Option<String>,
    /// Launch context
    pub context:       Option<SdkContext>,
    /// Failure message for context reads
    pub context_error: Option<String>,
    /// Readable SDK properties
    pub properties:    BTreeMap<String, ScriptedReply>,
    /// Wallet capability
    pub wallet:        Option<WalletFixture>,
}

impl SdkFixture {
    pub(super) fn build(&self) -> ScriptedSdk {
        let mut sdk = ScriptedSdk::ready();
        if let Some(message) = &self.ready_error {
            sdk = sdk.with_ready_error(message.clone());
        }
        if let Some(context) = &self.context {
            sdk = sdk.with_context(context.clone());
        }
        if let Some(message) = &self.context_error {
            sdk = sdk.with_context_error(message.clone());
        }
        for (name, reply) in &self.properties {
            sdk = match reply {
                ScriptedReply::Result(value) => sdk.with_property(name.clone(), value.clone()),
                ScriptedReply::Error(message) => {
                    sdk.with_property_error(name.clone(), message.clone())
                }
            };
        }
        if let Some(wallet) = &self.wallet {
            sdk = sdk.with_wallet(wallet.build());
        }
        sdk
    }
}

/// SDK wallet capability
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletFixture {
    /// Declared members; `getEthereumProvider` only when omitted
    pub methods:           Option<BTreeSet<WalletMethod>>,
    /// Provider the accessor hands out; nothing when omitted
    pub ethereum_provider: Option<ScriptedProviderFixture>,
    /// Failure message for the accessor
    pub accessor_error:    Option<String>,
}

impl WalletFixture {
    fn build(&self) -> ScriptedWallet {
        let wallet = match (&self.accessor_error, &self.ethereum_provider) {
            (Some(message), _) => ScriptedWallet::failing(message.clone()),
            (None, Some(provider)) => ScriptedWallet::with_provider(Arc::new(provider.build())),
            (None, None) => ScriptedWallet::without_provider(),
        };
        match &self.methods {
            Some(methods) => wallet.with_methods(methods.iter().copied()),
            None => wallet,
        }
    }
}
