//! Connected accounts and their credential material.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A refreshable OAuth token bundle for one account.
///
/// Credentials are value types: a provider never mutates one in place.
/// When applying a credential triggers a silent refresh, the provider
/// returns a new bundle and the orchestrator writes it back to the
/// registry for that account only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Long-lived token used to mint new access tokens, when granted.
    pub refresh_token: Option<String>,
    /// Expiry of the access token, when known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Whether the access token expires within `window` from now.
    ///
    /// An unknown expiry counts as expiring: the provider will refresh
    /// rather than gamble on a stale token.
    pub fn expires_within(&self, window: Duration) -> bool {
        match self.expires_at {
            Some(at) => at - Utc::now() <= window,
            None => true,
        }
    }
}

/// One externally-authenticated mailbox identity the service polls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Email address; the unique registry key.
    pub address: String,
    /// Current credential material for this account.
    pub credential: Credential,
    /// When the credential was last stored or refreshed.
    pub last_refreshed_at: DateTime<Utc>,
}

impl Account {
    /// Creates an account with a freshly issued credential.
    pub fn new(address: impl Into<String>, credential: Credential) -> Self {
        Self {
            address: address.into(),
            credential,
            last_refreshed_at: Utc::now(),
        }
    }
}
