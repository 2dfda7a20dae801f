//! Label classification.
//!
//! Maps the raw marker set a mailbox attaches to a message (Gmail label
//! ids) to the single application-level label shown in the feed.

use serde::{Deserialize, Serialize};

/// Application-level classification of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    /// Flagged as spam by the provider.
    Spam,
    /// Promotional mail (offers, marketing).
    Promotions,
    /// Social network notifications.
    Social,
    /// Automated updates (receipts, statements).
    Updates,
    /// Mailing list and forum traffic.
    Forums,
    /// Marked important by the provider.
    Important,
    /// Starred by the user.
    Starred,
    /// Sent mail.
    Sent,
    /// Unsent draft.
    Draft,
    /// Everything else.
    Inbox,
}

/// Priority table for classification. Spam must win over any category
/// marker, so it is checked first; the order below is load-bearing.
const PRIORITY: [(&str, Label); 9] = [
    ("SPAM", Label::Spam),
    ("CATEGORY_PROMOTIONS", Label::Promotions),
    ("CATEGORY_SOCIAL", Label::Social),
    ("CATEGORY_UPDATES", Label::Updates),
    ("CATEGORY_FORUMS", Label::Forums),
    ("IMPORTANT", Label::Important),
    ("STARRED", Label::Starred),
    ("SENT", Label::Sent),
    ("DRAFT", Label::Draft),
];

impl Label {
    /// Classifies a raw marker set into a single label.
    ///
    /// First match wins by the fixed priority above, independent of how
    /// many markers are present. An empty or unrecognized marker set
    /// classifies as [`Label::Inbox`]. Total and deterministic.
    pub fn classify(markers: &[String]) -> Label {
        for (marker, label) in PRIORITY {
            if markers.iter().any(|m| m == marker) {
                return label;
            }
        }
        Label::Inbox
    }
}
