//! Discovery configuration
//!
//! The only tunable is the announce window: how long Channel B listens for
//! `eip6963:announceProvider` replies after dispatching its request. It can
//! be set in code, from the environment, or from the CLI.

use std::time::Duration;

use crate::constants::{ANNOUNCE_WINDOW_ENV_VAR, DEFAULT_ANNOUNCE_WINDOW_MS};
use crate::error::{Error, Result};

/// Settings shared by every gather cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// How long announcements are collected before the listener is dropped
    pub announce_window: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            announce_window: Duration::from_millis(DEFAULT_ANNOUNCE_WINDOW_MS),
        }
    }
}

impl DiscoveryConfig {
    /// Build a configuration from `MINIAPP_PROBE_ANNOUNCE_WINDOW_MS`, falling
    /// back to the defaults when the variable is unset
    ///
    /// # Errors
    /// Returns a configuration error when the variable is set but is not a
    /// whole number of milliseconds.
    pub fn from_env() -> Result<Self> {
        match std::env::var(ANNOUNCE_WINDOW_ENV_VAR) {
            Ok(value) => Ok(Self::default().with_announce_window(parse_window_ms(&value)?)),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(e) => {
                Err(Error::config_invalid(ANNOUNCE_WINDOW_ENV_VAR, "<non-unicode>", e).into())
            }
        }
    }

    /// Replace the announce window
    #[must_use]
    pub const fn with_announce_window(mut self, window: Duration) -> Self {
        self.announce_window = window;
        self
    }
}

/// Parse an announce window given in milliseconds
fn parse_window_ms(value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| Error::config_invalid(ANNOUNCE_WINDOW_ENV_VAR, value, e).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_one_hundred_millis() {
        assert_eq!(
            DiscoveryConfig::default().announce_window,
            Duration::from_millis(100)
        );
    }

    #[test]
    fn parses_window_with_whitespace() {
        let window = parse_window_ms(" 250 ").ok();
        assert_eq!(window, Some(Duration::from_millis(250)));
    }

    #[test]
    fn rejects_non_numeric_window() {
        let result = parse_window_ms("fast");
        assert!(
            matches!(
                &result,
                Err(report) if matches!(report.current_context(), Error::Configuration(_))
            ),
            "expected configuration error, got {result:?}"
        );
    }
}
