//! Responder that answers provider requests on an [`AnnounceBus`]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{AnnounceBus, ProviderAnnouncement, send_announcement};
use crate::discovery::ProviderIdentity;
use crate::provider::EthereumProvider;

/// A provider that announces itself whenever a request is dispatched
#[derive(Clone)]
pub struct AnnounceResponder {
    identity: ProviderIdentity,
    provider: Arc<dyn EthereumProvider>,
    delay:    Duration,
}

impl std::fmt::Debug for AnnounceResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnounceResponder")
            .field("identity", &self.identity)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl AnnounceResponder {
    /// Responder announcing `identity` with `provider` as its handle
    pub const fn new(identity: ProviderIdentity, provider: Arc<dyn EthereumProvider>) -> Self {
        Self {
            identity,
            provider,
            delay: Duration::ZERO,
        }
    }

    /// Wait `delay` after each request before announcing
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Identity this responder announces
    pub const fn identity(&self) -> &ProviderIdentity {
        &self.identity
    }

    /// Attach to `bus` and answer requests until every handle to the bus is
    /// dropped
    ///
    /// The request subscription is registered before this returns, so a
    /// request dispatched right afterwards is already heard. Each reply runs
    /// on its own task, so a slow reply never delays the next one. The task
    /// only holds the announce side, so it never keeps the bus alive.
    pub fn spawn(self, bus: &AnnounceBus) -> JoinHandle<()> {
        let mut requests = bus.subscribe_requests();
        let announce_tx = bus.announcer();

        tokio::spawn(async move {
            loop {
                match requests.recv().await {
                    Ok(()) | Err(RecvError::Lagged(_)) => {
                        let announce_tx = announce_tx.clone();
                        let announcement = ProviderAnnouncement {
                            info:     self.identity.clone(),
                            provider: Arc::clone(&self.provider),
                        };
                        let delay = self.delay;
                        tokio::spawn(async move {
                            if !delay.is_zero() {
                                tokio::time::sleep(delay).await;
                            }
                            send_announcement(&announce_tx, announcement);
                        });
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!(name = ?self.identity.name, "responder detached");
        })
    }
}
