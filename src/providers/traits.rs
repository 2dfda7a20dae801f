//! Mailbox provider and credential issuer seams.
//!
//! The pipeline talks to the outside world through these two traits.
//! Credentials are explicit arguments on every call — a provider holds
//! no ambient token state, which is what keeps multiple accounts and
//! overlapping fetch cycles from bleeding into each other.

use async_trait::async_trait;

use crate::domain::{Credential, MessageId, PartitionQuery};

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur talking to a mailbox provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Credential rejected, expired without a refresh path, or revoked.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Network or connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, if known.
        retry_after_secs: Option<u64>,
    },

    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request or parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other provider-side failure.
    #[error("provider error: {0}")]
    Provider(String),
}

/// An applied credential, valid for the duration of one fetch.
///
/// Produced by [`MailboxProvider::authorize`]. When applying the
/// credential forced a silent refresh, `refreshed` carries the new
/// bundle for the caller to write back to the registry.
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer token to use for subsequent calls.
    pub access_token: String,
    /// Replacement credential when the inbound one was refreshed.
    pub refreshed: Option<Credential>,
}

/// Lightweight handle returned by a partition listing, before detail
/// retrieval. Discarded after in-account dedup.
#[derive(Debug, Clone)]
pub struct RawMessageRef {
    /// Provider-assigned message id.
    pub id: MessageId,
    /// Tag of the partition that listed this message.
    pub partition: String,
}

/// One raw message header.
#[derive(Debug, Clone)]
pub struct RawHeader {
    pub name: String,
    pub value: String,
}

/// Provider-neutral detail payload for a single message.
///
/// A payload whose id is missing never gets this far: it fails wire
/// deserialization inside the provider and surfaces as that message's
/// fetch failure.
#[derive(Debug, Clone)]
pub struct RawMessageDetail {
    /// Provider-assigned message id.
    pub id: MessageId,
    /// Raw marker set (Gmail label ids).
    pub label_ids: Vec<String>,
    /// Short body preview, if the provider supplied one.
    pub snippet: Option<String>,
    /// Provider-internal receive time, epoch milliseconds.
    pub internal_date_ms: Option<i64>,
    /// Message headers as returned; may be empty for malformed payloads.
    pub headers: Vec<RawHeader>,
}

impl RawMessageDetail {
    /// Case-insensitive header lookup, first occurrence wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

/// Exchanges authorization codes for account credentials.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    /// URL of the provider's consent page to redirect a connecting user to.
    fn authorize_url(&self) -> String;

    /// Exchanges an authorization code for the authenticated account's
    /// address and a refreshable credential bundle.
    async fn exchange(&self, code: &str) -> Result<(String, Credential)>;
}

/// Read access to one account's mailbox.
#[async_trait]
pub trait MailboxProvider: Send + Sync {
    /// Applies a credential, refreshing the access token when it is
    /// expired or about to expire.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Authentication`] when the credential is
    /// unusable and cannot be refreshed; the caller degrades the whole
    /// account to an empty contribution for this cycle.
    async fn authorize(&self, credential: &Credential) -> Result<Session>;

    /// Lists message handles matching one partition query.
    async fn list(&self, session: &Session, query: &PartitionQuery) -> Result<Vec<RawMessageRef>>;

    /// Retrieves the detail payload for one message.
    async fn get_detail(&self, session: &Session, id: &MessageId) -> Result<RawMessageDetail>;
}
