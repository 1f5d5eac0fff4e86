//! Report types produced by a gather cycle
//!
//! Absence is always a value: a channel that found nothing reports
//! `Unavailable` with a reason, a channel that failed reports `Error` with a
//! message, and a single failed field inside an otherwise good channel is a
//! [`FieldResult::Error`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize, Serializer};

use crate::constants::FIELD_ERROR_PREFIX;
use crate::provider::{ProviderError, ProviderMethod};
use crate::sdk::WalletMethod;

/// Self-declared provider metadata from an announcement
///
/// Announcements are unauthenticated, so every field is untrusted display
/// data and any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderIdentity {
    /// Human readable wallet name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name:        Option<String>,
    /// Reverse DNS identifier, e.g. `com.example.wallet`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rdns:        Option<String>,
    /// Per-session unique id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid:        Option<String>,
    /// Icon as a data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon:        Option<String>,
    /// Responder's own claim to be a mini app provider
    #[serde(default)]
    pub is_mini_app: bool,
}

impl ProviderIdentity {
    /// Identity with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the reverse DNS identifier
    #[must_use]
    pub fn with_rdns(mut self, rdns: impl Into<String>) -> Self {
        self.rdns = Some(rdns.into());
        self
    }

    /// Set the session uuid
    #[must_use]
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }
}

/// An accepted announcement: who announced, and what its handle implements
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCapabilitySummary {
    /// Announced identity
    pub identity:        ProviderIdentity,
    /// Members the announced handle declares
    pub exposed_methods: BTreeSet<ProviderMethod>,
}

/// Outcome of one discovery channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ChannelResult<T> {
    /// The channel produced data
    Available(T),
    /// The capability is absent; not an error
    Unavailable {
        /// Why nothing was found
        reason: String,
    },
    /// An attempted operation failed
    Error {
        /// Failure message from the collaborator
        message: String,
        /// Whatever was read before the failure
        #[serde(skip_serializing_if = "Option::is_none")]
        partial: Option<T>,
    },
}

impl<T> ChannelResult<T> {
    /// Absent capability with a reason
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Failure without partial data
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            partial: None,
        }
    }

    /// Failure that keeps what was read before it
    pub fn error_with_partial(message: impl Into<String>, partial: T) -> Self {
        Self::Error {
            message: message.into(),
            partial: Some(partial),
        }
    }

    /// Whether the channel produced data
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// The data, if the channel produced any
    pub const fn available(&self) -> Option<&T> {
        match self {
            Self::Available(data) => Some(data),
            Self::Unavailable { .. } | Self::Error { .. } => None,
        }
    }

    /// Data read before a failure, if any
    pub const fn partial(&self) -> Option<&T> {
        match self {
            Self::Error {
                partial: Some(data),
                ..
            } => Some(data),
            _ => None,
        }
    }

    /// Reason or message explaining why there is no data
    pub fn explanation(&self) -> Option<&str> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable { reason } => Some(reason.as_str()),
            Self::Error { message, .. } => Some(message.as_str()),
        }
    }
}

/// Result of one field probe inside an otherwise successful channel
///
/// Serializes as the bare value on success and as `"Error: <message>"` on
/// failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldResult<T> {
    /// The probe succeeded
    Value(T),
    /// The probe failed with this message
    Error(String),
}

impl<T> FieldResult<T> {
    /// The value, if the probe succeeded
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// The inline error string shown for a failed probe
    pub fn error_text(&self) -> Option<String> {
        match self {
            Self::Value(_) => None,
            Self::Error(message) => Some(format!("{FIELD_ERROR_PREFIX} {message}")),
        }
    }
}

impl<T> From<Result<T, ProviderError>> for FieldResult<T> {
    fn from(result: Result<T, ProviderError>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(e) => Self::Error(e.to_string()),
        }
    }
}

impl<T: Serialize> Serialize for FieldResult<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Value(value) => value.serialize(serializer),
            Self::Error(message) => {
                serializer.serialize_str(&format!("{FIELD_ERROR_PREFIX} {message}"))
            }
        }
    }
}

/// What Channel A read from the legacy global provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyProviderSnapshot {
    /// `isMetaMask` vendor flag
    pub is_metamask:    bool,
    /// Active chain id, when it was read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id:       Option<String>,
    /// Connected accounts, when they were read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounts:       Option<Vec<String>>,
    /// First account, or a "no connected account" sentinel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_address: Option<String>,
}

/// What Channel C read from the provider the SDK wallet handed out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkProviderSnapshot {
    /// Members the handle declares
    pub methods:  BTreeSet<ProviderMethod>,
    /// `eth_chainId` outcome
    pub chain_id: FieldResult<String>,
    /// `eth_accounts` outcome
    pub accounts: FieldResult<Vec<String>>,
}

/// Merged outcome of one gather cycle
///
/// Built once per cycle and never mutated afterwards. Every field is always
/// populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryReport {
    /// Channel A: legacy global provider
    pub window_provider:     ChannelResult<LegacyProviderSnapshot>,
    /// Channel B: accepted announcements, in arrival order
    pub announced_providers: Vec<ProviderCapabilitySummary>,
    /// Channel C: provider returned by the SDK wallet accessor
    pub sdk_provider:        ChannelResult<SdkProviderSnapshot>,
    /// Channel C: members the SDK wallet declares
    pub sdk_wallet_methods:  ChannelResult<BTreeSet<WalletMethod>>,
}
