//! Constants for discovery channels, rendering and configuration
//!
//! Event names and RPC method names follow EIP-6963 and EIP-1193.

// ============================================================================
// ANNOUNCE PROTOCOL CONSTANTS
// ============================================================================

/// Inbound event carrying `{ info, provider }` from a responder
pub const ANNOUNCE_PROVIDER_EVENT: &str = "eip6963:announceProvider";

/// Outbound event asking every responder to announce itself
pub const REQUEST_PROVIDER_EVENT: &str = "eip6963:requestProvider";

/// Buffered announcements per listener before it starts lagging
pub const ANNOUNCE_CHANNEL_CAPACITY: usize = 64;

// ============================================================================
// RPC CONSTANTS
// ============================================================================

pub const METHOD_CHAIN_ID: &str = "eth_chainId";
pub const METHOD_ACCOUNTS: &str = "eth_accounts";

pub const JSONRPC_VERSION: &str = "2.0";

/// Transport timeout for the HTTP provider, not a channel timeout
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// CHANNEL OUTCOME CONSTANTS
// ============================================================================

pub const REASON_NOT_AVAILABLE: &str = "Not available";
pub const REASON_ACCESSOR_NOT_FOUND: &str = "accessor method not found";
pub const REASON_PROVIDER_UNDEFINED: &str = "provider returned undefined";
pub const MSG_SDK_WALLET_NOT_AVAILABLE: &str = "sdk wallet not available";
pub const NO_CONNECTED_ACCOUNT: &str = "No connected account";

/// Prefix used when a per-field probe failure is rendered inline
pub const FIELD_ERROR_PREFIX: &str = "Error:";

// ============================================================================
// CLASSIFIER CONSTANTS
// ============================================================================

/// Lowercase keywords that mark a provider identity as part of the mini app family
pub const MINI_APP_KEYWORDS: [&str; 5] = ["frame", "farcaster", "miniapp", "cast", "warpcast"];

// ============================================================================
// SDK CONSTANTS
// ============================================================================

/// SDK members that are reported in their own sections, not as properties
pub const EXCLUDED_SDK_PROPERTIES: [&str; 2] = ["actions", "wallet"];

pub const MSG_HOST_SDK_NOT_PRESENT: &str = "host sdk not present";

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

pub const DEFAULT_ANNOUNCE_WINDOW_MS: u64 = 100;

/// Environment variable overriding the announce window, in milliseconds
pub const ANNOUNCE_WINDOW_ENV_VAR: &str = "MINIAPP_PROBE_ANNOUNCE_WINDOW_MS";

// ============================================================================
// RENDER CONSTANTS
// ============================================================================

/// Marker printed for a channel that produced no data
pub const NO_DATA_MARKER: &str = "no data:";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

pub const TRACE_LOG_FILE_NAME: &str = "miniapp_wallet_probe_trace.log";
