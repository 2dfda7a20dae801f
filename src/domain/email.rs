//! The canonical email entity served to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Label, MessageId};

/// A normalized email as it appears in the merged feed.
///
/// Constructed fresh on every fetch cycle and never mutated afterwards.
/// `id` is unique within one account; across accounts the (account, id)
/// pair is the key. `date` is always resolved — the normalizer falls back
/// to the current time rather than leaving it empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    /// Provider-assigned message id.
    pub id: MessageId,
    /// Address of the account this message was fetched from.
    pub account: String,
    /// Subject line, `"No Subject"` when the header is absent.
    pub subject: String,
    /// Raw From header, `"Unknown Sender"` when absent.
    pub from: String,
    /// Display name extracted from the From header.
    pub sender_name: String,
    /// Address extracted from the From header; falls back to the whole
    /// header value when it does not match `Name <address>`.
    pub sender_email: String,
    /// Resolved display timestamp.
    pub date: DateTime<Utc>,
    /// Short preview of the message body.
    pub snippet: String,
    /// Application-level classification.
    pub label: Label,
    /// Whether the message has been read.
    pub is_read: bool,
    /// Whether the provider flagged the message as spam.
    pub is_spam: bool,
}
