//! Text rendering of inspector snapshots
//!
//! Each section is a title followed by a JSON block. Sections with nothing in
//! them are left out, except the wallet channels: those always render, either
//! as data or as a `no data:` line naming the reason.

use error_stack::ResultExt;
use json_pretty_compact::PrettyCompactFormatter;
use serde::Serialize;
use serde_json::Serializer;

use crate::constants::NO_DATA_MARKER;
use crate::discovery::{ChannelResult, DiscoveryReport};
use crate::error::{Error, Result};
use crate::inspector::{EnvironmentSnapshot, InspectorSnapshot};

const TITLE: &str = "Mini App Wallet Probe";

const NOT_READY_REASONS: [&str; 3] = [
    "The page is not running inside a host application that supports mini apps",
    "The host SDK has not been initialized",
    "The page was not loaded as a mini app",
];

/// Serialize `value` with compact arrays inside a pretty layout
///
/// # Errors
/// Returns a render error when `value` cannot be serialized.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyCompactFormatter::new());

    value
        .serialize(&mut ser)
        .map_err(|e| Error::Render(format!("Failed to serialize JSON: {e}")))?;

    String::from_utf8(buf).change_context(Error::Render(
        "Failed to convert JSON bytes to string".to_string(),
    ))
}

/// Render a full snapshot
///
/// # Errors
/// Returns a render error when a section cannot be serialized.
pub fn render_snapshot(snapshot: &InspectorSnapshot) -> Result<String> {
    let mut lines = vec![
        format!("=== {TITLE} ==="),
        format!(
            "refresh #{} at {}",
            snapshot.generation, snapshot.environment.timestamp
        ),
    ];

    push_section(&mut lines, "SDK Context", snapshot.context.as_ref())?;
    push_section(&mut lines, "User Info", snapshot.user.as_ref())?;
    push_section(&mut lines, "Cast Info", snapshot.cast.as_ref())?;
    push_section(&mut lines, "Client Info", snapshot.client.as_ref())?;
    if let Some(report) = &snapshot.wallet {
        lines.push(String::new());
        lines.push("## Wallet Providers".to_string());
        lines.push(render_wallet_report(report)?);
    }
    push_section(
        &mut lines,
        "SDK Properties",
        Some(&snapshot.sdk_properties).filter(|properties| !properties.is_empty()),
    )?;
    push_section(&mut lines, "Environment", Some(&snapshot.environment))?;
    if let Some(error) = &snapshot.error {
        lines.push(String::new());
        lines.push("## Error".to_string());
        lines.push(error.clone());
    }

    Ok(lines.join("\n"))
}

/// Render the view shown when the host SDK never became ready
///
/// # Errors
/// Returns a render error when the environment cannot be serialized.
pub fn render_not_ready(environment: &EnvironmentSnapshot) -> Result<String> {
    let mut lines = vec![
        format!("=== {TITLE} ==="),
        "Host SDK not available".to_string(),
        String::new(),
        "Wallet discovery needs the host SDK. This typically means:".to_string(),
    ];
    lines.extend(NOT_READY_REASONS.iter().map(|reason| format!("  - {reason}")));
    lines.push("Load the page inside a host application that supports mini apps.".to_string());

    push_section(&mut lines, "Environment", Some(environment))?;
    Ok(lines.join("\n"))
}

/// Render the four wallet channels of one report
///
/// # Errors
/// Returns a render error when channel data cannot be serialized.
pub fn render_wallet_report(report: &DiscoveryReport) -> Result<String> {
    let mut lines = Vec::new();

    push_channel(&mut lines, "Legacy global provider", &report.window_provider)?;

    lines.push("### Announced providers".to_string());
    if report.announced_providers.is_empty() {
        lines.push(format!("{NO_DATA_MARKER} no mini app provider announced"));
    } else {
        lines.push(to_pretty_json(&report.announced_providers)?);
    }

    push_channel(&mut lines, "SDK wallet provider", &report.sdk_provider)?;
    push_channel(&mut lines, "SDK wallet methods", &report.sdk_wallet_methods)?;

    Ok(lines.join("\n"))
}

fn push_section<T: Serialize>(
    lines: &mut Vec<String>,
    title: &str,
    data: Option<&T>,
) -> Result<()> {
    let Some(data) = data else {
        return Ok(());
    };
    lines.push(String::new());
    lines.push(format!("## {title}"));
    lines.push(to_pretty_json(data)?);
    Ok(())
}

fn push_channel<T: Serialize>(
    lines: &mut Vec<String>,
    title: &str,
    channel: &ChannelResult<T>,
) -> Result<()> {
    lines.push(format!("### {title}"));
    match channel {
        ChannelResult::Available(data) => lines.push(to_pretty_json(data)?),
        ChannelResult::Unavailable { reason } => lines.push(format!("{NO_DATA_MARKER} {reason}")),
        ChannelResult::Error { message, partial } => {
            lines.push(format!("{NO_DATA_MARKER} error: {message}"));
            if let Some(partial) = partial {
                lines.push(format!("read before the error: {}", to_pretty_json(partial)?));
            }
        }
    }
    Ok(())
}
