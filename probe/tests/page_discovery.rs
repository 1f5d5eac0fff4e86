//! End-to-end discovery over the bundled demo page

#![allow(clippy::expect_used, reason = "tests")]

use std::collections::BTreeSet;
use std::time::Duration;

use miniapp_wallet_probe::page::PageFixture;
use miniapp_wallet_probe::render;
use miniapp_wallet_probe::{ChannelResult, DiscoveryConfig, FieldResult, WalletMethod};
use serde_json::json;

const DEMO_PAGE: &str = include_str!("../demos/warpcast_page.json");

fn demo_fixture() -> PageFixture {
    PageFixture::from_json(DEMO_PAGE).expect("demo page should parse")
}

#[tokio::test(start_paused = true)]
async fn demo_page_report() {
    let page = demo_fixture().build();
    let report = page.discovery(DiscoveryConfig::default()).gather().await;

    let legacy = report.window_provider.available().cloned().unwrap_or_default();
    assert!(legacy.is_metamask);
    assert_eq!(legacy.chain_id.as_deref(), Some("0x1"));
    assert_eq!(legacy.active_address.as_deref(), Some("No connected account"));

    let announced: Vec<_> = report
        .announced_providers
        .iter()
        .filter_map(|summary| summary.identity.name.as_deref())
        .collect();
    assert_eq!(announced, vec!["Warpcast Wallet"]);

    let sdk_provider = report.sdk_provider.available().expect("sdk provider");
    assert_eq!(sdk_provider.chain_id, FieldResult::Value("0x2105".to_string()));
    assert_eq!(sdk_provider.accounts, FieldResult::Error("Unauthorized".to_string()));
    assert_eq!(
        report.sdk_wallet_methods,
        ChannelResult::Available(BTreeSet::from([
            WalletMethod::GetEthereumProvider,
            WalletMethod::GetSolanaProvider,
        ]))
    );
}

#[tokio::test(start_paused = true)]
async fn wider_window_admits_slow_responder() {
    let page = demo_fixture().build();
    let config = DiscoveryConfig::default().with_announce_window(Duration::from_millis(300));
    let report = page.discovery(config).gather().await;

    let announced: Vec<_> = report
        .announced_providers
        .iter()
        .filter_map(|summary| summary.identity.name.as_deref())
        .collect();
    assert_eq!(announced, vec!["Warpcast Wallet", "Farcaster Slow Wallet"]);
}

#[tokio::test(start_paused = true)]
async fn report_serializes_with_channel_status() {
    let page = demo_fixture().build();
    let report = page.discovery(DiscoveryConfig::default()).gather().await;
    let value = serde_json::to_value(&report).expect("report should serialize");

    assert_eq!(value["windowProvider"]["status"], json!("available"));
    assert_eq!(value["sdkProvider"]["detail"]["accounts"], json!("Error: Unauthorized"));
    assert_eq!(
        value["announcedProviders"][0]["identity"]["rdns"],
        json!("xyz.warpcast.miniapp")
    );
}

#[tokio::test(start_paused = true)]
async fn inspector_renders_demo_page() {
    let page = demo_fixture().build();
    let inspector = page.inspector(DiscoveryConfig::default());

    assert!(inspector.init().await);
    let snapshot = inspector.snapshot().expect("init should publish a snapshot");
    assert_eq!(
        snapshot.sdk_properties.get("quickAuth"),
        Some(&json!("[Error accessing quickAuth]"))
    );
    assert!(!snapshot.sdk_properties.contains_key("actions"));

    let text = render::render_snapshot(&snapshot).expect("snapshot should render");
    for section in [
        "## SDK Context",
        "## User Info",
        "## Client Info",
        "## Wallet Providers",
        "## SDK Properties",
        "## Environment",
    ] {
        assert!(text.contains(section), "missing section {section}");
    }
    assert!(!text.contains("## Cast Info"));
    assert!(text.contains("Warpcast Wallet"));
    assert!(text.contains("Error: Unauthorized"));
}

#[tokio::test(start_paused = true)]
async fn refreshes_advance_generation() {
    let page = demo_fixture().build();
    let inspector = page.inspector(DiscoveryConfig::default());
    assert!(inspector.init().await);

    let second = inspector.refresh().await;
    let third = inspector.show().await.expect("ready inspector re-gathers on show");
    assert_eq!(second.generation, 2);
    assert_eq!(third.generation, 3);
}
