//! Host SDK and wallet whose behavior is fixed up front

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{HostSdk, SdkContext, SdkError, SdkWallet, WalletMethod};
use crate::constants::MSG_HOST_SDK_NOT_PRESENT;
use crate::provider::{EthereumProvider, ProviderError};

/// What the scripted wallet accessor hands out
#[derive(Clone)]
enum AccessorOutcome {
    Provider(Arc<dyn EthereumProvider>),
    Nothing,
    Failure(String),
}

/// SDK wallet with a fixed member set and accessor outcome
#[derive(Clone)]
pub struct ScriptedWallet {
    methods:  BTreeSet<WalletMethod>,
    accessor: AccessorOutcome,
}

impl std::fmt::Debug for ScriptedWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let accessor = match &self.accessor {
            AccessorOutcome::Provider(_) => "provider",
            AccessorOutcome::Nothing => "nothing",
            AccessorOutcome::Failure(_) => "failure",
        };
        f.debug_struct("ScriptedWallet")
            .field("methods", &self.methods)
            .field("accessor", &accessor)
            .finish()
    }
}

impl ScriptedWallet {
    /// Wallet whose accessor hands out `provider`
    pub fn with_provider(provider: Arc<dyn EthereumProvider>) -> Self {
        Self {
            methods:  BTreeSet::from([WalletMethod::GetEthereumProvider]),
            accessor: AccessorOutcome::Provider(provider),
        }
    }

    /// Wallet whose accessor resolves to nothing
    pub fn without_provider() -> Self {
        Self {
            methods:  BTreeSet::from([WalletMethod::GetEthereumProvider]),
            accessor: AccessorOutcome::Nothing,
        }
    }

    /// Wallet whose accessor rejects with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            methods:  BTreeSet::from([WalletMethod::GetEthereumProvider]),
            accessor: AccessorOutcome::Failure(message.into()),
        }
    }

    /// Replace the declared member set
    #[must_use]
    pub fn with_methods(mut self, methods: impl IntoIterator<Item = WalletMethod>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }
}

#[async_trait]
impl SdkWallet for ScriptedWallet {
    fn methods(&self) -> BTreeSet<WalletMethod> {
        self.methods.clone()
    }

    async fn get_ethereum_provider(
        &self,
    ) -> Result<Option<Arc<dyn EthereumProvider>>, ProviderError> {
        match &self.accessor {
            AccessorOutcome::Provider(provider) => Ok(Some(Arc::clone(provider))),
            AccessorOutcome::Nothing => Ok(None),
            AccessorOutcome::Failure(message) => Err(ProviderError::Rejected(message.clone())),
        }
    }
}

/// Host SDK with fixed readiness, context, properties and wallet
#[derive(Debug, Clone)]
pub struct ScriptedSdk {
    ready:      Result<(), String>,
    context:    Result<Option<SdkContext>, String>,
    properties: BTreeMap<String, Result<Value, String>>,
    wallet:     Option<ScriptedWallet>,
}

impl Default for ScriptedSdk {
    fn default() -> Self {
        Self::ready()
    }
}

impl ScriptedSdk {
    /// SDK that completes the handshake and exposes nothing else
    pub const fn ready() -> Self {
        Self {
            ready:      Ok(()),
            context:    Ok(None),
            properties: BTreeMap::new(),
            wallet:     None,
        }
    }

    /// SDK of a page that is not running inside a host application
    pub fn absent() -> Self {
        Self {
            ready: Err(MSG_HOST_SDK_NOT_PRESENT.to_string()),
            ..Self::ready()
        }
    }

    /// Fail the readiness handshake with `message`
    #[must_use]
    pub fn with_ready_error(mut self, message: impl Into<String>) -> Self {
        self.ready = Err(message.into());
        self
    }

    /// Report `context` as the launch context
    #[must_use]
    pub fn with_context(mut self, context: SdkContext) -> Self {
        self.context = Ok(Some(context));
        self
    }

    /// Fail every context read with `message`
    #[must_use]
    pub fn with_context_error(mut self, message: impl Into<String>) -> Self {
        self.context = Err(message.into());
        self
    }

    /// Expose a readable property
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), Ok(value));
        self
    }

    /// Expose a property whose read fails with `message`
    #[must_use]
    pub fn with_property_error(
        mut self,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.properties.insert(name.into(), Err(message.into()));
        self
    }

    /// Expose `wallet` as the wallet capability
    #[must_use]
    pub fn with_wallet(mut self, wallet: ScriptedWallet) -> Self {
        self.wallet = Some(wallet);
        self
    }
}

#[async_trait]
impl HostSdk for ScriptedSdk {
    async fn ready(&self) -> Result<(), SdkError> {
        self.ready.clone().map_err(SdkError::NotReady)
    }

    fn context(&self) -> Result<Option<SdkContext>, SdkError> {
        self.context.clone().map_err(SdkError::Context)
    }

    fn properties(&self) -> BTreeMap<String, Result<Value, SdkError>> {
        self.properties
            .iter()
            .map(|(name, value)| (name.clone(), value.clone().map_err(SdkError::Property)))
            .collect()
    }

    fn wallet(&self) -> Option<Arc<dyn SdkWallet>> {
        self.wallet
            .clone()
            .map(|wallet| Arc::new(wallet) as Arc<dyn SdkWallet>)
    }
}
