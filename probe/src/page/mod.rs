//! Simulated page contexts
//!
//! A [`PageFixture`] is loaded from JSON and built into a [`Page`]: the set
//! of collaborators discovery runs against. Building spawns one task per
//! announce responder, so it must happen inside a tokio runtime.

mod fixture;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use error_stack::Report;
pub use fixture::{
    LegacyFixture, PageFixture, ResponderFixture, ScriptedProviderFixture, SdkFixture,
    WalletFixture,
};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::announce::{AnnounceBus, AnnounceResponder};
use crate::config::DiscoveryConfig;
use crate::discovery::ProviderDiscovery;
use crate::error::{Error, Result};
use crate::inspector::{Inspector, PageEnvironment};
use crate::provider::EthereumProvider;
use crate::sdk::{HostSdk, ScriptedSdk};

impl PageFixture {
    /// Read a fixture from a JSON file
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or is not a valid fixture.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Report::new(Error::io_failed("read", path, e)))?;
        Self::from_json(&contents)
            .map_err(|report| report.attach(format!("fixture file: {}", path.display())))
    }

    /// Parse a fixture from JSON text
    ///
    /// # Errors
    /// Returns a fixture error when the text is not a valid fixture.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Report::new(Error::fixture_invalid(e)))
    }

    /// Build the page, spawning its responders onto the current runtime
    pub fn build(&self) -> Page {
        let bus = AnnounceBus::new();
        let responders = self
            .responders
            .iter()
            .map(|responder| {
                let identity = match responder.info.uuid {
                    Some(_) => responder.info.clone(),
                    None => responder
                        .info
                        .clone()
                        .with_uuid(uuid::Uuid::new_v4().to_string()),
                };
                let announcer = AnnounceResponder::new(
                    identity,
                    Arc::new(responder.provider.build()),
                )
                .with_delay(Duration::from_millis(responder.delay_ms));
                debug!(
                    name = ?announcer.identity().name,
                    uuid = ?announcer.identity().uuid,
                    "spawning responder"
                );
                announcer.spawn(&bus)
            })
            .collect();

        let sdk: Arc<dyn HostSdk> = match &self.sdk {
            Some(sdk) => Arc::new(sdk.build()),
            None => Arc::new(ScriptedSdk::absent()),
        };

        debug!(
            legacy = self.legacy.is_some(),
            responders = self.responders.len(),
            sdk = self.sdk.is_some(),
            "page built"
        );

        Page {
            legacy: self.legacy.as_ref().map(LegacyFixture::build),
            bus,
            sdk,
            environment: self.environment.clone(),
            responders,
        }
    }
}

/// Collaborators reachable from one page context
pub struct Page {
    /// Legacy global provider
    pub legacy:      Option<Arc<dyn EthereumProvider>>,
    /// Broadcast bus the responders listen on
    pub bus:         AnnounceBus,
    /// Host SDK
    pub sdk:         Arc<dyn HostSdk>,
    /// Environment facts
    pub environment: PageEnvironment,
    responders:      Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("legacy", &self.legacy.is_some())
            .field("bus", &self.bus)
            .field("environment", &self.environment)
            .field("responders", &self.responders.len())
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Replace the legacy global provider
    #[must_use]
    pub fn with_legacy(mut self, legacy: Arc<dyn EthereumProvider>) -> Self {
        self.legacy = Some(legacy);
        self
    }

    /// Discovery aggregator over this page
    pub fn discovery(&self, config: DiscoveryConfig) -> ProviderDiscovery {
        ProviderDiscovery::new(
            self.legacy.clone(),
            self.bus.clone(),
            Arc::clone(&self.sdk),
            config,
        )
    }

    /// Inspector over this page
    pub fn inspector(&self, config: DiscoveryConfig) -> Inspector {
        Inspector::new(
            Arc::clone(&self.sdk),
            self.discovery(config),
            self.environment.clone(),
        )
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        for responder in &self.responders {
            responder.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, reason = "tests")]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;
    use crate::discovery::ChannelResult;
    use crate::sdk::WalletMethod;

    const FIXTURE: &str = r#"{
        "legacy": {
            "kind": "scripted",
            "is_metamask": true,
            "replies": {
                "eth_chainId": {"result": "0x2105"},
                "eth_accounts": {"error": "User rejected"}
            }
        },
        "responders": [
            {"info": {"name": "Warpcast Wallet", "rdns": "xyz.warpcast"}, "delay_ms": 20},
            {"info": {"name": "MetaMask", "uuid": "fixed"}}
        ],
        "sdk": {
            "context": {"user": {"fid": 3}},
            "properties": {"isInMiniApp": {"result": true}},
            "wallet": {
                "ethereum_provider": {"replies": {"eth_chainId": {"result": 8453}}}
            }
        },
        "environment": {"url": "https://example.org/app"}
    }"#;

    #[test]
    fn fixture_parses_every_section() {
        let fixture = PageFixture::from_json(FIXTURE).expect("fixture should parse");

        assert!(matches!(
            fixture.legacy,
            Some(LegacyFixture::Scripted(ScriptedProviderFixture {
                is_metamask: true,
                ..
            }))
        ));
        assert_eq!(fixture.responders.len(), 2);
        assert_eq!(fixture.environment.url.as_deref(), Some("https://example.org/app"));
    }

    #[test]
    fn http_legacy_provider_parses() {
        let fixture = PageFixture::from_json(
            r#"{"legacy": {"kind": "http", "rpc_url": "http://127.0.0.1:8545"}}"#,
        )
        .expect("fixture should parse");
        assert_eq!(
            fixture.legacy,
            Some(LegacyFixture::Http {
                rpc_url: "http://127.0.0.1:8545".to_string(),
            })
        );
    }

    #[test]
    fn invalid_fixture_is_a_fixture_error() {
        let result = PageFixture::from_json(r#"{"responders": [{"delay_ms": 5}]}"#);
        assert!(
            matches!(
                &result,
                Err(report) if matches!(report.current_context(), Error::Fixture(_))
            ),
            "unexpected result: {result:?}"
        );
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let result = PageFixture::load(Path::new("/nonexistent/page.json"));
        assert!(matches!(
            &result,
            Err(report) if matches!(report.current_context(), Error::FileOperation(_))
        ));
    }

    #[test]
    fn load_reads_fixture_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(FIXTURE.as_bytes()).expect("write fixture");

        let fixture = PageFixture::load(file.path()).expect("fixture should load");
        assert!(fixture.sdk.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn built_page_drives_every_channel() {
        let page = PageFixture::from_json(FIXTURE).expect("fixture should parse").build();
        let report = page.discovery(DiscoveryConfig::default()).gather().await;

        assert_eq!(report.window_provider.explanation(), Some("User rejected"));
        assert_eq!(
            report.window_provider.partial().and_then(|s| s.chain_id.as_deref()),
            Some("0x2105")
        );

        assert_eq!(report.announced_providers.len(), 1);
        let uuid = report
            .announced_providers
            .first()
            .and_then(|p| p.identity.uuid.as_deref())
            .and_then(|uuid| uuid::Uuid::parse_str(uuid).ok());
        assert!(uuid.is_some(), "responder without uuid should get a generated one");

        let chain_id = report
            .sdk_provider
            .available()
            .and_then(|s| s.chain_id.value().cloned());
        assert_eq!(chain_id.as_deref(), Some("0x2105"));
        assert_eq!(
            report.sdk_wallet_methods,
            ChannelResult::Available([WalletMethod::GetEthereumProvider].into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn page_without_sdk_is_not_ready() {
        let page = PageFixture::default().build();
        let inspector = page.inspector(DiscoveryConfig::default());

        assert!(!inspector.init().await);
        assert_eq!(serde_json::to_value(&page.environment).ok(), Some(json!({})));
    }
}
