//! # Mini App Wallet Probe
//!
//! Discovers every wallet-capable provider reachable from a mini app page
//! context and reports them as one structured snapshot for debugging.
//!
//! Three independent discovery channels are probed on every gather cycle:
//! - the legacy global provider (a single injected `EthereumProvider`)
//! - the `eip6963` broadcast/announce protocol on an [`AnnounceBus`]
//! - the provider accessor exposed by the host SDK wallet
//!
//! Their outcomes are merged by [`ProviderDiscovery::gather`] into a
//! [`DiscoveryReport`]. A channel failure is recorded as data in that report
//! and never aborts the other channels.

pub mod announce;
pub mod classifier;
pub mod config;
mod constants;
pub mod discovery;
pub mod error;
pub mod inspector;
pub mod logging;
pub mod page;
pub mod provider;
pub mod render;
pub mod sdk;

pub use announce::{AnnounceBus, AnnounceResponder, ProviderAnnouncement};
pub use classifier::is_mini_app_provider;
pub use config::DiscoveryConfig;
pub use discovery::{
    ChannelResult, DiscoveryReport, FieldResult, LegacyProviderSnapshot,
    ProviderCapabilitySummary, ProviderDiscovery, ProviderIdentity, SdkProviderSnapshot,
};
pub use inspector::{Inspector, InspectorSnapshot};
pub use provider::{EthereumProvider, ProviderError, ProviderMethod};
pub use sdk::{HostSdk, SdkError, SdkWallet, WalletMethod};
