//! Discovery aggregator
//!
//! [`ProviderDiscovery::gather`] probes the three discovery channels
//! concurrently on the calling task and merges their outcomes into one
//! [`DiscoveryReport`]. The announce window in Channel B never delays
//! Channels A or C, and a failure in one channel is recorded as data without
//! touching the others.

mod announced;
mod legacy;
mod sdk_wallet;
mod types;

use std::sync::Arc;

use tracing::debug;
pub use types::{
    ChannelResult, DiscoveryReport, FieldResult, LegacyProviderSnapshot,
    ProviderCapabilitySummary, ProviderIdentity, SdkProviderSnapshot,
};

use crate::announce::AnnounceBus;
use crate::config::DiscoveryConfig;
use crate::provider::EthereumProvider;
use crate::sdk::HostSdk;

/// Collaborators reachable from one page context
#[derive(Clone)]
pub struct ProviderDiscovery {
    legacy: Option<Arc<dyn EthereumProvider>>,
    bus:    AnnounceBus,
    sdk:    Arc<dyn HostSdk>,
    config: DiscoveryConfig,
}

impl std::fmt::Debug for ProviderDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDiscovery")
            .field("legacy", &self.legacy.is_some())
            .field("bus", &self.bus)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ProviderDiscovery {
    /// Create an aggregator over the given page collaborators
    pub const fn new(
        legacy: Option<Arc<dyn EthereumProvider>>,
        bus: AnnounceBus,
        sdk: Arc<dyn HostSdk>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            legacy,
            bus,
            sdk,
            config,
        }
    }

    /// Run one gather cycle
    ///
    /// Never fails: every channel outcome, including failures, is a value in
    /// the returned report. Completes once all three channels have settled,
    /// which takes at least the configured announce window.
    pub async fn gather(&self) -> DiscoveryReport {
        debug!(
            legacy = self.legacy.is_some(),
            window_ms = self.config.announce_window.as_millis(),
            "gathering providers"
        );

        let (window_provider, announced_providers, sdk_wallet) = tokio::join!(
            legacy::probe_legacy_provider(self.legacy.as_deref()),
            announced::collect_announced_providers(&self.bus, self.config.announce_window),
            sdk_wallet::probe_sdk_wallet(self.sdk.as_ref()),
        );

        DiscoveryReport {
            window_provider,
            announced_providers,
            sdk_provider: sdk_wallet.provider,
            sdk_wallet_methods: sdk_wallet.methods,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::announce::AnnounceResponder;
    use crate::constants::{METHOD_ACCOUNTS, METHOD_CHAIN_ID};
    use crate::provider::{ProviderMethod, ScriptedProvider};
    use crate::sdk::{ScriptedSdk, ScriptedWallet, WalletMethod};

    fn discovery(
        legacy: Option<Arc<dyn EthereumProvider>>,
        bus: &AnnounceBus,
        sdk: ScriptedSdk,
    ) -> ProviderDiscovery {
        ProviderDiscovery::new(legacy, bus.clone(), Arc::new(sdk), DiscoveryConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn empty_page_reports_every_channel_absent() {
        let bus = AnnounceBus::new();
        let report = discovery(None, &bus, ScriptedSdk::absent()).gather().await;

        assert_eq!(
            report,
            DiscoveryReport {
                window_provider:     ChannelResult::unavailable("Not available"),
                announced_providers: Vec::new(),
                sdk_provider:        ChannelResult::error("sdk wallet not available"),
                sdk_wallet_methods:  ChannelResult::error("sdk wallet not available"),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn all_channels_populated() {
        let bus = AnnounceBus::new();
        AnnounceResponder::new(
            ProviderIdentity::named("Warpcast Wallet"),
            Arc::new(ScriptedProvider::new()),
        )
        .with_delay(Duration::from_millis(20))
        .spawn(&bus);
        AnnounceResponder::new(
            ProviderIdentity::named("MetaMask").with_rdns("io.metamask"),
            Arc::new(ScriptedProvider::new()),
        )
        .spawn(&bus);

        let legacy = ScriptedProvider::new()
            .with_metamask_flag(true)
            .with_result(METHOD_CHAIN_ID, json!("0x1"))
            .with_result(METHOD_ACCOUNTS, json!([]));
        let sdk_handle = ScriptedProvider::new()
            .with_methods([ProviderMethod::Request, ProviderMethod::On])
            .with_result(METHOD_CHAIN_ID, json!("0x2105"))
            .with_result(METHOD_ACCOUNTS, json!(["0xabc"]));
        let sdk = ScriptedSdk::ready()
            .with_wallet(ScriptedWallet::with_provider(Arc::new(sdk_handle)));

        let report = discovery(Some(Arc::new(legacy)), &bus, sdk).gather().await;

        let legacy = report.window_provider.available().cloned().unwrap_or_default();
        assert!(legacy.is_metamask);
        assert_eq!(legacy.active_address.as_deref(), Some("No connected account"));

        assert_eq!(report.announced_providers.len(), 1);
        assert_eq!(
            report.announced_providers.first().and_then(|p| p.identity.name.as_deref()),
            Some("Warpcast Wallet")
        );

        let sdk_provider = report.sdk_provider.available();
        assert_eq!(
            sdk_provider.and_then(|s| s.chain_id.value()).map(String::as_str),
            Some("0x2105")
        );
        assert_eq!(
            report.sdk_wallet_methods,
            ChannelResult::Available(BTreeSet::from([WalletMethod::GetEthereumProvider]))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn channels_run_concurrently() {
        let bus = AnnounceBus::new();
        let slow_legacy = ScriptedProvider::new()
            .with_delay(Duration::from_millis(80))
            .with_result(METHOD_CHAIN_ID, json!("0x1"))
            .with_result(METHOD_ACCOUNTS, json!(["0xaaa"]));

        let started = tokio::time::Instant::now();
        let report = discovery(Some(Arc::new(slow_legacy)), &bus, ScriptedSdk::absent())
            .gather()
            .await;

        // two 80ms legacy reads overlap the 100ms window instead of following it
        assert!(started.elapsed() < Duration::from_millis(260));
        assert!(started.elapsed() >= Duration::from_millis(160));
        assert!(report.window_provider.is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn failing_channel_does_not_affect_others() {
        let bus = AnnounceBus::new();
        AnnounceResponder::new(
            ProviderIdentity::default().with_rdns("xyz.farcaster"),
            Arc::new(ScriptedProvider::new()),
        )
        .spawn(&bus);
        let legacy = ScriptedProvider::new().with_error(METHOD_CHAIN_ID, "User rejected");
        let sdk = ScriptedSdk::ready().with_wallet(ScriptedWallet::failing("bridge closed"));

        let report = discovery(Some(Arc::new(legacy)), &bus, sdk).gather().await;

        assert_eq!(report.window_provider.explanation(), Some("User rejected"));
        assert_eq!(report.sdk_provider.explanation(), Some("bridge closed"));
        assert!(report.sdk_wallet_methods.is_available());
        assert_eq!(report.announced_providers.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn configured_window_is_honored() {
        let bus = AnnounceBus::new();
        AnnounceResponder::new(
            ProviderIdentity::named("Farcaster Wallet"),
            Arc::new(ScriptedProvider::new()),
        )
        .with_delay(Duration::from_millis(150))
        .spawn(&bus);

        let config = DiscoveryConfig::default().with_announce_window(Duration::from_millis(200));
        let discovery = ProviderDiscovery::new(
            None,
            bus.clone(),
            Arc::new(ScriptedSdk::absent()),
            config,
        );

        assert_eq!(discovery.gather().await.announced_providers.len(), 1);
    }
}
