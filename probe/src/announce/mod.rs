//! In-process `eip6963` broadcast/announce bus
//!
//! Two events travel over the bus. `eip6963:requestProvider` carries no
//! payload and asks every responder to announce itself.
//! `eip6963:announceProvider` carries a [`ProviderAnnouncement`]. Any number
//! of responders and listeners may be attached. A listener only sees
//! announcements sent after it subscribed.

mod responder;

use std::sync::Arc;

pub use responder::AnnounceResponder;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use crate::constants::{ANNOUNCE_CHANNEL_CAPACITY, ANNOUNCE_PROVIDER_EVENT, REQUEST_PROVIDER_EVENT};
use crate::discovery::ProviderIdentity;
use crate::provider::EthereumProvider;

/// Payload of an `eip6963:announceProvider` event
#[derive(Clone)]
pub struct ProviderAnnouncement {
    /// Self-declared identity of the responder
    pub info:     ProviderIdentity,
    /// Provider handle the responder hands out
    pub provider: Arc<dyn EthereumProvider>,
}

impl std::fmt::Debug for ProviderAnnouncement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderAnnouncement")
            .field("info", &self.info)
            .field("provider_methods", &self.provider.methods())
            .finish()
    }
}

/// Publish/subscribe bus shared by the page and its responders
///
/// Cloning the bus yields another handle onto the same channels.
#[derive(Debug, Clone)]
pub struct AnnounceBus {
    announce_tx: broadcast::Sender<ProviderAnnouncement>,
    request_tx:  broadcast::Sender<()>,
}

impl Default for AnnounceBus {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnounceBus {
    /// Create a bus with the default per-listener buffer
    pub fn new() -> Self {
        Self::with_capacity(ANNOUNCE_CHANNEL_CAPACITY)
    }

    /// Create a bus buffering up to `capacity` events per listener
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (announce_tx, _) = broadcast::channel(capacity);
        let (request_tx, _) = broadcast::channel(capacity);
        Self {
            announce_tx,
            request_tx,
        }
    }

    /// Register an announcement listener
    ///
    /// The listener is removed when the returned value is dropped.
    pub fn subscribe_announcements(&self) -> AnnouncementListener {
        AnnouncementListener {
            receiver: self.announce_tx.subscribe(),
        }
    }

    /// Register a request listener, as a responder does
    pub fn subscribe_requests(&self) -> broadcast::Receiver<()> {
        self.request_tx.subscribe()
    }

    /// Dispatch `eip6963:requestProvider`, returning how many responders heard it
    pub fn request_providers(&self) -> usize {
        let responders = self.request_tx.send(()).unwrap_or(0);
        debug!(event = REQUEST_PROVIDER_EVENT, responders, "dispatched");
        responders
    }

    /// Dispatch `eip6963:announceProvider`, returning how many listeners heard it
    pub fn announce(&self, announcement: ProviderAnnouncement) -> usize {
        send_announcement(&self.announce_tx, announcement)
    }

    /// Announce side only, for responders
    ///
    /// Holding it does not keep the request side open.
    fn announcer(&self) -> broadcast::Sender<ProviderAnnouncement> {
        self.announce_tx.clone()
    }

    /// Number of announcement listeners currently registered
    pub fn listener_count(&self) -> usize {
        self.announce_tx.receiver_count()
    }
}

fn send_announcement(
    announce_tx: &broadcast::Sender<ProviderAnnouncement>,
    announcement: ProviderAnnouncement,
) -> usize {
    let name = announcement.info.name.clone();
    let listeners = announce_tx.send(announcement).unwrap_or(0);
    trace!(event = ANNOUNCE_PROVIDER_EVENT, ?name, listeners, "dispatched");
    listeners
}

/// Registered announcement listener
#[derive(Debug)]
pub struct AnnouncementListener {
    receiver: broadcast::Receiver<ProviderAnnouncement>,
}

impl AnnouncementListener {
    /// Wait for the next announcement
    ///
    /// Returns `None` once the bus has been dropped. Announcements lost to
    /// a full buffer are skipped with a warning.
    pub async fn recv(&mut self) -> Option<ProviderAnnouncement> {
        loop {
            match self.receiver.recv().await {
                Ok(announcement) => return Some(announcement),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "announcement listener lagged, announcements dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
