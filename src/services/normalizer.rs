//! Message normalization.
//!
//! Converts one raw provider payload into the canonical [`Email`]
//! entity. Normalization is total: malformed-but-present data is
//! defaulted, never rejected. The only unrecoverable condition — a
//! payload without a message id — fails wire deserialization upstream
//! and is handled as a per-message fetch failure.

use chrono::{DateTime, Utc};

use crate::domain::{Email, Label};
use crate::providers::RawMessageDetail;

const UNREAD_MARKER: &str = "UNREAD";
const SPAM_MARKER: &str = "SPAM";

/// Normalizes one message detail payload into an [`Email`].
pub fn normalize(account: &str, detail: &RawMessageDetail) -> Email {
    let subject = detail
        .header("Subject")
        .map(str::to_owned)
        .unwrap_or_else(|| "No Subject".to_string());
    let from = detail
        .header("From")
        .map(str::to_owned)
        .unwrap_or_else(|| "Unknown Sender".to_string());

    let (sender_name, sender_email) = split_sender(&from);

    Email {
        id: detail.id.clone(),
        account: account.to_string(),
        subject,
        from,
        sender_name,
        sender_email,
        date: resolve_date(detail),
        snippet: detail.snippet.clone().unwrap_or_default(),
        label: Label::classify(&detail.label_ids),
        is_read: !detail.label_ids.iter().any(|l| l == UNREAD_MARKER),
        is_spam: detail.label_ids.iter().any(|l| l == SPAM_MARKER),
    }
}

/// Resolves the display timestamp through the fallback chain:
/// Date header, then the Received header's date segment, then the
/// provider-internal timestamp, then the current time. A step that
/// fails to parse falls through rather than erroring.
fn resolve_date(detail: &RawMessageDetail) -> DateTime<Utc> {
    detail
        .header("Date")
        .and_then(parse_rfc2822)
        .or_else(|| detail.header("Received").and_then(received_date))
        .or_else(|| {
            detail
                .internal_date_ms
                .and_then(DateTime::from_timestamp_millis)
        })
        .unwrap_or_else(Utc::now)
}

fn parse_rfc2822(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Extracts the timestamp from a Received header. The date sits after
/// the final `;`, per the trace-field grammar.
fn received_date(value: &str) -> Option<DateTime<Utc>> {
    value.rsplit(';').next().and_then(parse_rfc2822)
}

/// Splits a From header into (display name, address) following the
/// `Display Name <address>` pattern. When the pattern does not match,
/// the whole value serves as both, with surrounding quotes stripped
/// from the name side.
fn split_sender(from: &str) -> (String, String) {
    let from = from.trim();
    if let (Some(start), Some(end)) = (from.find('<'), from.rfind('>')) {
        if start < end {
            let address = from[start + 1..end].trim();
            let name = strip_quotes(from[..start].trim());
            if !address.is_empty() {
                if !name.is_empty() {
                    return (name.to_string(), address.to_string());
                }
                // "<a@b.c>" with no display part: the address stands in.
                return (address.to_string(), address.to_string());
            }
        }
    }
    (strip_quotes(from).to_string(), from.to_string())
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageId;
    use crate::providers::RawHeader;
    use chrono::Duration;

    fn detail(headers: &[(&str, &str)], labels: &[&str], internal_ms: Option<i64>) -> RawMessageDetail {
        RawMessageDetail {
            id: MessageId::from("m-1"),
            label_ids: labels.iter().map(|s| s.to_string()).collect(),
            snippet: Some("preview".to_string()),
            internal_date_ms: internal_ms,
            headers: headers
                .iter()
                .map(|(name, value)| RawHeader {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn missing_headers_get_defaults() {
        let email = normalize("a@x.com", &detail(&[], &[], Some(1_714_564_800_000)));
        assert_eq!(email.subject, "No Subject");
        assert_eq!(email.from, "Unknown Sender");
        assert_eq!(email.account, "a@x.com");
    }

    #[test]
    fn sender_pattern_is_split() {
        let email = normalize(
            "a@x.com",
            &detail(&[("From", "Alice Liddell <alice@example.com>")], &[], None),
        );
        assert_eq!(email.sender_name, "Alice Liddell");
        assert_eq!(email.sender_email, "alice@example.com");
    }

    #[test]
    fn quoted_display_name_is_unquoted() {
        let email = normalize(
            "a@x.com",
            &detail(&[("From", "\"Bob\" <bob@example.com>")], &[], None),
        );
        assert_eq!(email.sender_name, "Bob");
    }

    #[test]
    fn bare_address_is_name_and_address() {
        let email = normalize("a@x.com", &detail(&[("From", "noreply@example.com")], &[], None));
        assert_eq!(email.sender_name, "noreply@example.com");
        assert_eq!(email.sender_email, "noreply@example.com");
    }

    #[test]
    fn angle_only_sender_uses_address_as_name() {
        let email = normalize("a@x.com", &detail(&[("From", "<sys@example.com>")], &[], None));
        assert_eq!(email.sender_name, "sys@example.com");
        assert_eq!(email.sender_email, "sys@example.com");
    }

    #[test]
    fn date_header_wins() {
        let email = normalize(
            "a@x.com",
            &detail(
                &[
                    ("Date", "Wed, 01 May 2024 12:00:00 +0000"),
                    ("Received", "by mx; Thu, 02 May 2024 00:00:00 +0000"),
                ],
                &[],
                Some(1_800_000_000_000),
            ),
        );
        assert_eq!(email.date.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn received_header_is_second() {
        let email = normalize(
            "a@x.com",
            &detail(
                &[(
                    "Received",
                    "from mta.example.com by mx.google.com; Thu, 02 May 2024 00:00:00 +0000",
                )],
                &[],
                Some(1_800_000_000_000),
            ),
        );
        assert_eq!(email.date.to_rfc3339(), "2024-05-02T00:00:00+00:00");
    }

    #[test]
    fn internal_date_is_third() {
        let email = normalize(
            "a@x.com",
            &detail(&[("Date", "not a date")], &[], Some(1_714_564_800_000)),
        );
        assert_eq!(email.date, DateTime::from_timestamp_millis(1_714_564_800_000).unwrap());
    }

    #[test]
    fn no_usable_date_falls_back_to_now() {
        let before = Utc::now();
        let email = normalize("a@x.com", &detail(&[("Date", "garbage")], &[], None));
        let after = Utc::now();
        assert!(email.date >= before - Duration::seconds(1));
        assert!(email.date <= after + Duration::seconds(1));
    }

    #[test]
    fn unread_and_spam_markers_set_flags() {
        let email = normalize("a@x.com", &detail(&[], &["UNREAD", "SPAM"], None));
        assert!(!email.is_read);
        assert!(email.is_spam);
        assert_eq!(email.label, Label::Spam);

        let email = normalize("a@x.com", &detail(&[], &["INBOX"], None));
        assert!(email.is_read);
        assert!(!email.is_spam);
        assert_eq!(email.label, Label::Inbox);
    }

    #[test]
    fn snippet_defaults_to_empty() {
        let mut d = detail(&[], &[], None);
        d.snippet = None;
        let email = normalize("a@x.com", &d);
        assert_eq!(email.snippet, "");
    }
}
