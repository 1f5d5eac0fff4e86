//! # Mini App Wallet Probe
//!
//! Builds a page context from a JSON fixture (or an empty one), runs the
//! inspector over it and prints each snapshot as text or JSON.
//!
//! Channel failures are part of the output. The exit status is only non-zero
//! when the command line, configuration or fixture is unusable.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use error_stack::Report;
use miniapp_wallet_probe::error::{Error, Result};
use miniapp_wallet_probe::inspector::EnvironmentSnapshot;
use miniapp_wallet_probe::logging::{self, TracingLevel};
use miniapp_wallet_probe::page::PageFixture;
use miniapp_wallet_probe::provider::HttpProvider;
use miniapp_wallet_probe::{DiscoveryConfig, InspectorSnapshot, render};
use serde_json::json;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "miniapp_wallet_probe", version)]
#[command(about = "Discover and report the wallet providers reachable from a mini app page")]
struct Cli {
    /// Page fixture describing the injected provider, responders and host SDK
    #[arg(long)]
    page: Option<PathBuf>,

    /// JSON-RPC endpoint to use as the legacy global provider
    #[arg(long)]
    rpc_url: Option<String>,

    /// Announce window in milliseconds (overrides MINIAPP_PROBE_ANNOUNCE_WINDOW_MS)
    #[arg(long)]
    window_ms: Option<u64>,

    /// Print snapshots as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Additional refresh cycles after the first snapshot
    #[arg(long, default_value_t = 0)]
    refresh: u32,

    /// Tracing level: error, warn, info, debug or trace
    #[arg(long, default_value = "warn")]
    log_level: TracingLevel,

    /// Write tracing output to a file in the temp directory instead of stderr
    #[arg(long)]
    trace_log: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("Error: {report:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.trace_log {
        let path = logging::init_file_tracing(cli.log_level)?;
        eprintln!("Tracing to {}", path.display());
    } else {
        logging::init_stderr_tracing(cli.log_level)?;
    }
    debug!(level = TracingLevel::current().as_str(), "tracing initialized");

    let mut config = DiscoveryConfig::from_env()?;
    if let Some(window_ms) = cli.window_ms {
        config = config.with_announce_window(Duration::from_millis(window_ms));
    }

    let fixture = match &cli.page {
        Some(path) => PageFixture::load(path)?,
        None => PageFixture::default(),
    };
    let mut page = fixture.build();
    if let Some(rpc_url) = &cli.rpc_url {
        if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            return Err(Report::new(Error::invalid("rpc url", rpc_url))
                .attach("expected an http:// or https:// endpoint"));
        }
        let provider = HttpProvider::new(rpc_url.clone());
        debug!(url = provider.url(), "using http legacy provider");
        page = page.with_legacy(Arc::new(provider));
    }

    let inspector = page.inspector(config);
    if !inspector.init().await {
        return print_not_ready(&inspector.environment(), cli.json);
    }

    if let Some(snapshot) = inspector.snapshot() {
        print_snapshot(&snapshot, cli.json)?;
    }

    for _ in 0..cli.refresh {
        tokio::select! {
            snapshot = inspector.refresh() => print_snapshot(&snapshot, cli.json)?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, skipping remaining refreshes");
                break;
            }
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &InspectorSnapshot, as_json: bool) -> Result<()> {
    let output = if as_json {
        render::to_pretty_json(snapshot)?
    } else {
        render::render_snapshot(snapshot)?
    };
    println!("{output}");
    Ok(())
}

fn print_not_ready(environment: &EnvironmentSnapshot, as_json: bool) -> Result<()> {
    let output = if as_json {
        render::to_pretty_json(&json!({
            "sdkReady": false,
            "environment": environment,
        }))?
    } else {
        render::render_not_ready(environment)?
    };
    println!("{output}");
    Ok(())
}
