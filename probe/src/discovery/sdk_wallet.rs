//! Channel C: the provider handed out by the host SDK wallet

use std::collections::BTreeSet;

use tracing::debug;

use super::types::{ChannelResult, SdkProviderSnapshot};
use crate::constants::{
    MSG_SDK_WALLET_NOT_AVAILABLE, REASON_ACCESSOR_NOT_FOUND, REASON_PROVIDER_UNDEFINED,
};
use crate::provider::{self, EthereumProvider};
use crate::sdk::{HostSdk, WalletMethod};

/// Both Channel C outcomes: the accessor's provider and the wallet's members
pub(super) struct SdkWalletOutcome {
    pub(super) provider: ChannelResult<SdkProviderSnapshot>,
    pub(super) methods:  ChannelResult<BTreeSet<WalletMethod>>,
}

pub(super) async fn probe_sdk_wallet(sdk: &dyn HostSdk) -> SdkWalletOutcome {
    let Some(wallet) = sdk.wallet() else {
        debug!("host sdk exposes no wallet");
        return SdkWalletOutcome {
            provider: ChannelResult::error(MSG_SDK_WALLET_NOT_AVAILABLE),
            methods:  ChannelResult::error(MSG_SDK_WALLET_NOT_AVAILABLE),
        };
    };

    let methods = wallet.methods();
    let provider = if methods.contains(&WalletMethod::GetEthereumProvider) {
        match wallet.get_ethereum_provider().await {
            Ok(Some(handle)) => ChannelResult::Available(snapshot_provider(handle.as_ref()).await),
            Ok(None) => ChannelResult::unavailable(REASON_PROVIDER_UNDEFINED),
            Err(e) => {
                debug!(error = %e, "sdk provider accessor failed");
                ChannelResult::error(e.to_string())
            }
        }
    } else {
        ChannelResult::unavailable(REASON_ACCESSOR_NOT_FOUND)
    };

    SdkWalletOutcome {
        provider,
        methods: ChannelResult::Available(methods),
    }
}

/// Read each field independently; a failed field never hides the others
async fn snapshot_provider(handle: &dyn EthereumProvider) -> SdkProviderSnapshot {
    SdkProviderSnapshot {
        methods:  handle.methods(),
        chain_id: provider::request_chain_id(handle).await.into(),
        accounts: provider::request_accounts(handle).await.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::constants::{METHOD_ACCOUNTS, METHOD_CHAIN_ID};
    use crate::discovery::FieldResult;
    use crate::provider::ScriptedProvider;
    use crate::sdk::{ScriptedSdk, ScriptedWallet};

    #[tokio::test]
    async fn missing_wallet_fails_both_outcomes() {
        let outcome = probe_sdk_wallet(&ScriptedSdk::ready()).await;
        assert_eq!(outcome.provider, ChannelResult::error("sdk wallet not available"));
        assert_eq!(outcome.methods, ChannelResult::error("sdk wallet not available"));
    }

    #[tokio::test]
    async fn wallet_without_accessor_is_unavailable() {
        let sdk = ScriptedSdk::ready().with_wallet(
            ScriptedWallet::without_provider().with_methods([WalletMethod::GetSolanaProvider]),
        );

        let outcome = probe_sdk_wallet(&sdk).await;
        assert_eq!(
            outcome.provider,
            ChannelResult::unavailable("accessor method not found")
        );
        assert_eq!(
            outcome.methods,
            ChannelResult::Available(BTreeSet::from([WalletMethod::GetSolanaProvider]))
        );
    }

    #[tokio::test]
    async fn accessor_returning_nothing_is_unavailable() {
        let sdk = ScriptedSdk::ready().with_wallet(ScriptedWallet::without_provider());
        let outcome = probe_sdk_wallet(&sdk).await;
        assert_eq!(
            outcome.provider,
            ChannelResult::unavailable("provider returned undefined")
        );
    }

    #[tokio::test]
    async fn accessor_failure_keeps_wallet_methods() {
        let sdk = ScriptedSdk::ready().with_wallet(ScriptedWallet::failing("bridge closed"));
        let outcome = probe_sdk_wallet(&sdk).await;
        assert_eq!(outcome.provider, ChannelResult::error("bridge closed"));
        assert!(outcome.methods.is_available());
    }

    #[tokio::test]
    async fn field_failures_stay_inline() {
        let handle = ScriptedProvider::new()
            .with_error(METHOD_CHAIN_ID, "execution reverted")
            .with_result(METHOD_ACCOUNTS, json!(["0xabc"]));
        let sdk = ScriptedSdk::ready().with_wallet(ScriptedWallet::with_provider(Arc::new(handle)));

        let outcome = probe_sdk_wallet(&sdk).await;
        let snapshot = outcome.provider.available().cloned();
        assert_eq!(
            snapshot.as_ref().map(|s| s.chain_id.clone()),
            Some(FieldResult::Error("execution reverted".to_string()))
        );
        assert_eq!(
            snapshot.map(|s| s.accounts),
            Some(FieldResult::Value(vec!["0xabc".to_string()]))
        );
    }
}
