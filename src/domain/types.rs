//! Core identifier types for domain entities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-assigned identifier for a single message.
///
/// Unique within one mailbox; two different accounts may legitimately
/// produce the same id, so the global key is the (account, id) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
