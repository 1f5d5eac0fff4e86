//! Channel B: providers announced over the broadcast bus

use std::time::Duration;

use futures::{StreamExt, future, stream};
use tracing::{debug, trace};

use super::types::ProviderCapabilitySummary;
use crate::announce::{AnnounceBus, ProviderAnnouncement};
use crate::classifier::is_mini_app_provider;

/// Collect mini app providers that announce within `window`
///
/// The listener is registered before the request is dispatched, so replies
/// sent synchronously by a responder are not lost. When the window elapses
/// the listener is dropped and later announcements go nowhere.
pub(super) async fn collect_announced_providers(
    bus: &AnnounceBus,
    window: Duration,
) -> Vec<ProviderCapabilitySummary> {
    let listener = bus.subscribe_announcements();
    let responders = bus.request_providers();
    debug!(responders, window_ms = window.as_millis(), "listening for announcements");

    let announcements = stream::unfold(listener, |mut listener| async move {
        listener
            .recv()
            .await
            .map(|announcement| (announcement, listener))
    });

    let accepted: Vec<_> = announcements
        .take_until(tokio::time::sleep(window))
        .filter_map(|announcement| future::ready(summarize_if_accepted(announcement)))
        .collect()
        .await;

    debug!(accepted = accepted.len(), "announce window closed");
    accepted
}

fn summarize_if_accepted(announcement: ProviderAnnouncement) -> Option<ProviderCapabilitySummary> {
    if !is_mini_app_provider(&announcement.info) {
        trace!(
            name = ?announcement.info.name,
            rdns = ?announcement.info.rdns,
            "rejected announcement"
        );
        return None;
    }

    Some(ProviderCapabilitySummary {
        exposed_methods: announcement.provider.methods(),
        identity:        announcement.info,
    })
}
