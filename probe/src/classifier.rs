//! Mini app provider classifier
//!
//! A cheap relevance filter over self-declared identity strings. It is not an
//! authentication boundary: any responder can claim a matching name.

use crate::constants::MINI_APP_KEYWORDS;
use crate::discovery::ProviderIdentity;

/// Whether an announced identity belongs to the mini app provider family
///
/// True when the lowercased `name` or `rdns` contains any of
/// `frame`, `farcaster`, `miniapp`, `cast` or `warpcast`. Missing fields never
/// match.
pub fn is_mini_app_provider(identity: &ProviderIdentity) -> bool {
    [identity.name.as_deref(), identity.rdns.as_deref()]
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .any(|field| MINI_APP_KEYWORDS.iter().any(|keyword| field.contains(keyword)))
}
