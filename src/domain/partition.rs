//! Mailbox partitions queried on every fetch cycle.

use serde::{Deserialize, Serialize};

/// A named subset of a mailbox queried independently.
///
/// The selector is the provider's filter expression; the tag is the
/// logical partition name carried on listing results. The set of
/// partitions is static configuration, not mutated at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionQuery {
    /// Provider-specific filter expression, e.g. `in:spam`.
    pub selector: String,
    /// Logical partition name, e.g. `SPAM`.
    pub tag: String,
}

impl PartitionQuery {
    /// Creates a partition query.
    pub fn new(selector: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            tag: tag.into(),
        }
    }

    /// The default partition set: inbox, spam, and the category tabs.
    pub fn defaults() -> Vec<PartitionQuery> {
        vec![
            PartitionQuery::new("in:inbox", "INBOX"),
            PartitionQuery::new("in:spam", "SPAM"),
            PartitionQuery::new("category:promotions", "PROMOTIONS"),
            PartitionQuery::new("category:social", "SOCIAL"),
            PartitionQuery::new("category:updates", "UPDATES"),
            PartitionQuery::new("category:forums", "FORUMS"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_inbox_and_spam() {
        let partitions = PartitionQuery::defaults();
        assert_eq!(partitions.len(), 6);
        assert!(partitions.iter().any(|p| p.tag == "INBOX"));
        assert!(partitions.iter().any(|p| p.tag == "SPAM"));
    }

    #[test]
    fn default_tags_are_distinct() {
        let partitions = PartitionQuery::defaults();
        let mut tags: Vec<_> = partitions.iter().map(|p| p.tag.as_str()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), partitions.len());
    }
}
