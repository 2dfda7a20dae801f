//! Provider implementations.
//!
//! [`MailboxProvider`] and [`CredentialIssuer`] are the seams the fetch
//! pipeline depends on; [`GmailClient`] implements both against the
//! Gmail REST API. Tests substitute in-memory implementations.

mod gmail;
mod traits;

pub use gmail::{GmailClient, OAuthConfig};
pub use traits::{
    CredentialIssuer, MailboxProvider, ProviderError, RawHeader, RawMessageDetail, RawMessageRef,
    Result, Session,
};
