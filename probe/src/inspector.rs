//! Inspector: the outer gathering context around discovery
//!
//! Performs the SDK readiness handshake, then on every refresh captures the
//! SDK launch context, the readable SDK properties, the wallet discovery
//! report and the page environment into one [`InspectorSnapshot`].
//!
//! Refresh cycles may overlap. Each cycle takes a generation number when it
//! starts and a finished cycle only replaces the published snapshot if no
//! newer cycle has published already.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::constants::EXCLUDED_SDK_PROPERTIES;
use crate::discovery::{DiscoveryReport, ProviderDiscovery};
use crate::sdk::{ClientContext, HostSdk, SdkContext, UserContext};

/// Page facts the environment section reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvironment {
    /// Browser user agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Page url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url:        Option<String>,
    /// Referring page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer:   Option<String>,
}

impl PageEnvironment {
    /// Stamp the environment with the current local time
    pub fn capture(&self) -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            page:      self.clone(),
            timestamp: chrono::Local::now().to_rfc3339(),
        }
    }
}

/// Environment section of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentSnapshot {
    /// Page facts
    #[serde(flatten)]
    pub page:      PageEnvironment,
    /// RFC 3339 capture time
    pub timestamp: String,
}

/// Everything one refresh cycle gathered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectorSnapshot {
    /// Cycle number, increasing with every refresh started
    pub generation:     u64,
    /// Full launch context
    pub context:        Option<SdkContext>,
    /// Launching user
    pub user:           Option<UserContext>,
    /// Cast the mini app was launched from
    pub cast:           Option<Value>,
    /// Hosting client
    pub client:         Option<ClientContext>,
    /// Readable SDK properties; failed reads hold `[Error accessing <name>]`
    pub sdk_properties: BTreeMap<String, Value>,
    /// Wallet discovery report, absent when the cycle stopped early
    pub wallet:         Option<DiscoveryReport>,
    /// Page environment at capture time
    pub environment:    EnvironmentSnapshot,
    /// Failure of the gathering step itself
    pub error:          Option<String>,
}

impl InspectorSnapshot {
    fn empty(generation: u64, environment: EnvironmentSnapshot) -> Self {
        Self {
            generation,
            context: None,
            user: None,
            cast: None,
            client: None,
            sdk_properties: BTreeMap::new(),
            wallet: None,
            environment,
            error: None,
        }
    }
}

/// Drives readiness and refresh cycles for one page
pub struct Inspector {
    sdk:             Arc<dyn HostSdk>,
    discovery:       ProviderDiscovery,
    environment:     PageEnvironment,
    sdk_ready:       AtomicBool,
    next_generation: AtomicU64,
    latest:          Mutex<Option<Arc<InspectorSnapshot>>>,
}

impl std::fmt::Debug for Inspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inspector")
            .field("discovery", &self.discovery)
            .field("environment", &self.environment)
            .field("sdk_ready", &self.is_sdk_ready())
            .finish_non_exhaustive()
    }
}

impl Inspector {
    /// Create an inspector; nothing is gathered until [`Inspector::init`]
    pub const fn new(
        sdk: Arc<dyn HostSdk>,
        discovery: ProviderDiscovery,
        environment: PageEnvironment,
    ) -> Self {
        Self {
            sdk,
            discovery,
            environment,
            sdk_ready: AtomicBool::new(false),
            next_generation: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    /// Complete the readiness handshake and run the first refresh
    ///
    /// Returns whether the SDK became ready. A failed handshake leaves the
    /// inspector in the not-ready state and gathers nothing.
    pub async fn init(&self) -> bool {
        match self.sdk.ready().await {
            Ok(()) => {
                self.sdk_ready.store(true, Ordering::Release);
                info!("host sdk ready");
                self.refresh().await;
                true
            }
            Err(e) => {
                warn!(error = %e, "host sdk not ready");
                false
            }
        }
    }

    /// Whether the readiness handshake succeeded
    pub fn is_sdk_ready(&self) -> bool {
        self.sdk_ready.load(Ordering::Acquire)
    }

    /// Run one gather cycle and return the newest published snapshot
    ///
    /// When a newer cycle finished first, this cycle's result is discarded
    /// and the newer snapshot is returned.
    pub async fn refresh(&self) -> Arc<InspectorSnapshot> {
        let generation = self.next_generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(generation, "refresh started");
        let snapshot = Arc::new(self.gather_snapshot(generation).await);
        self.publish(snapshot)
    }

    /// Re-gather when shown, if the SDK is ready
    pub async fn show(&self) -> Option<Arc<InspectorSnapshot>> {
        if self.is_sdk_ready() {
            Some(self.refresh().await)
        } else {
            None
        }
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Option<Arc<InspectorSnapshot>> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current page environment, for the not-ready view
    pub fn environment(&self) -> EnvironmentSnapshot {
        self.environment.capture()
    }

    fn publish(&self, snapshot: Arc<InspectorSnapshot>) -> Arc<InspectorSnapshot> {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        match latest.as_ref() {
            Some(current) if current.generation > snapshot.generation => {
                debug!(
                    stale = snapshot.generation,
                    current = current.generation,
                    "discarding stale refresh"
                );
                Arc::clone(current)
            }
            _ => {
                *latest = Some(Arc::clone(&snapshot));
                snapshot
            }
        }
    }

    async fn gather_snapshot(&self, generation: u64) -> InspectorSnapshot {
        let mut snapshot = InspectorSnapshot::empty(generation, self.environment.capture());

        match self.sdk.context() {
            Ok(context) => {
                if let Some(context) = &context {
                    snapshot.user.clone_from(&context.user);
                    snapshot.cast.clone_from(&context.cast);
                    snapshot.client.clone_from(&context.client);
                }
                snapshot.context = context;
            }
            Err(e) => {
                warn!(generation, error = %e, "failed to read sdk context");
                snapshot.error = Some(e.to_string());
                return snapshot;
            }
        }

        snapshot.sdk_properties = self
            .sdk
            .properties()
            .into_iter()
            .filter(|(name, _)| !EXCLUDED_SDK_PROPERTIES.contains(&name.as_str()))
            .map(|(name, value)| {
                let value = value
                    .unwrap_or_else(|_| Value::String(format!("[Error accessing {name}]")));
                (name, value)
            })
            .collect();

        snapshot.wallet = Some(self.discovery.gather().await);
        debug!(generation, "refresh gathered");
        snapshot
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, reason = "tests")]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::announce::AnnounceBus;
    use crate::config::DiscoveryConfig;
    use crate::constants::METHOD_CHAIN_ID;
    use crate::provider::{EthereumProvider, ProviderError, ProviderMethod};
    use crate::sdk::ScriptedSdk;

    fn inspector(sdk: ScriptedSdk, legacy: Option<Arc<dyn EthereumProvider>>) -> Inspector {
        let sdk: Arc<dyn HostSdk> = Arc::new(sdk);
        let discovery = ProviderDiscovery::new(
            legacy,
            AnnounceBus::new(),
            Arc::clone(&sdk),
            DiscoveryConfig::default(),
        );
        Inspector::new(sdk, discovery, PageEnvironment::default())
    }

    /// Provider whose first request stalls and later ones answer at once
    struct SlowFirstProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EthereumProvider for SlowFirstProvider {
        async fn request(
            &self,
            method: &str,
            _params: Option<Value>,
        ) -> Result<Value, ProviderError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            if method == METHOD_CHAIN_ID {
                Ok(json!("0x1"))
            } else {
                Ok(json!([]))
            }
        }

        fn methods(&self) -> BTreeSet<ProviderMethod> {
            BTreeSet::from([ProviderMethod::Request])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_handshake_gathers_nothing() {
        let inspector = inspector(ScriptedSdk::absent(), None);

        assert!(!inspector.init().await);
        assert!(!inspector.is_sdk_ready());
        assert!(inspector.snapshot().is_none());
        assert!(inspector.show().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn ready_sdk_captures_context_sections() {
        let context: SdkContext = serde_json::from_value(json!({
            "user": {"fid": 3, "username": "dwr"},
            "client": {"clientFid": 9152, "added": false},
            "cast": {"hash": "0xcafe"}
        }))
        .expect("context fixture should deserialize");
        let sdk = ScriptedSdk::ready()
            .with_context(context)
            .with_property("isInMiniApp", json!(true))
            .with_property_error("quickAuth", "getter threw")
            .with_property("actions", json!({}));
        let inspector = inspector(sdk, None);

        assert!(inspector.init().await);
        let snapshot = inspector.snapshot().expect("init should publish a snapshot");

        assert_eq!(snapshot.user.as_ref().map(|u| u.fid), Some(3));
        assert_eq!(snapshot.client.as_ref().map(|c| c.client_fid), Some(9152));
        assert_eq!(snapshot.cast, Some(json!({"hash": "0xcafe"})));
        assert_eq!(snapshot.sdk_properties.get("isInMiniApp"), Some(&json!(true)));
        assert_eq!(
            snapshot.sdk_properties.get("quickAuth"),
            Some(&json!("[Error accessing quickAuth]"))
        );
        assert!(!snapshot.sdk_properties.contains_key("actions"));
        assert!(snapshot.wallet.is_some());
        assert!(snapshot.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn context_failure_sets_top_level_error() {
        let sdk = ScriptedSdk::ready().with_context_error("context bridge closed");
        let inspector = inspector(sdk, None);

        let snapshot = inspector.refresh().await;
        assert_eq!(snapshot.error.as_deref(), Some("context bridge closed"));
        assert!(snapshot.wallet.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_refresh_does_not_overwrite_newer_one() {
        let legacy: Arc<dyn EthereumProvider> = Arc::new(SlowFirstProvider {
            calls: AtomicUsize::new(0),
        });
        let inspector = inspector(ScriptedSdk::ready(), Some(legacy));

        let (first, second) = tokio::join!(inspector.refresh(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            inspector.refresh().await
        });

        assert_eq!(second.generation, 2);
        assert_eq!(first.generation, 2);
        assert_eq!(inspector.snapshot().map(|s| s.generation), Some(2));
    }
}
