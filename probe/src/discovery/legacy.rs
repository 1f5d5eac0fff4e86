//! Channel A: the legacy global provider

use tracing::debug;

use super::types::{ChannelResult, LegacyProviderSnapshot};
use crate::constants::{NO_CONNECTED_ACCOUNT, REASON_NOT_AVAILABLE};
use crate::provider::{self, EthereumProvider, ProviderError};

/// Probe the single injected provider, if the page has one
///
/// Reads run in order: vendor flag, chain id, accounts. The first failure
/// stops the probe and the fields read before it are kept as partial data.
pub(super) async fn probe_legacy_provider(
    legacy: Option<&dyn EthereumProvider>,
) -> ChannelResult<LegacyProviderSnapshot> {
    let Some(legacy) = legacy else {
        debug!("no legacy provider injected");
        return ChannelResult::unavailable(REASON_NOT_AVAILABLE);
    };

    let mut snapshot = LegacyProviderSnapshot {
        is_metamask: legacy.is_metamask(),
        ..LegacyProviderSnapshot::default()
    };

    match read_chain_and_accounts(legacy, &mut snapshot).await {
        Ok(()) => {
            debug!(chain_id = ?snapshot.chain_id, "legacy provider probed");
            ChannelResult::Available(snapshot)
        }
        Err(e) => {
            debug!(error = %e, "legacy provider probe failed");
            ChannelResult::error_with_partial(e.to_string(), snapshot)
        }
    }
}

async fn read_chain_and_accounts(
    legacy: &dyn EthereumProvider,
    snapshot: &mut LegacyProviderSnapshot,
) -> Result<(), ProviderError> {
    snapshot.chain_id = Some(provider::request_chain_id(legacy).await?);

    let accounts = provider::request_accounts(legacy).await?;
    snapshot.active_address = Some(
        accounts
            .first()
            .cloned()
            .unwrap_or_else(|| NO_CONNECTED_ACCOUNT.to_string()),
    );
    snapshot.accounts = Some(accounts);
    Ok(())
}
