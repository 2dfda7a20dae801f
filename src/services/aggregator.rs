//! Fetch orchestration.
//!
//! Fans the per-account fetcher out across every registered account,
//! writes refreshed credentials back, and merges the contributions
//! into one date-ordered feed.

use std::sync::Arc;

use futures::future::join_all;

use crate::domain::Email;
use crate::registry::AccountRegistry;
use crate::services::AccountFetcher;

/// Orchestrates one fetch cycle across all registered accounts.
pub struct Aggregator {
    registry: Arc<AccountRegistry>,
    fetcher: AccountFetcher,
    /// Upper bound on the merged feed length.
    max_feed: usize,
}

impl Aggregator {
    /// Creates an aggregator over the given registry and fetcher.
    pub fn new(registry: Arc<AccountRegistry>, fetcher: AccountFetcher, max_feed: usize) -> Self {
        Self {
            registry,
            fetcher,
            max_feed,
        }
    }

    /// Runs one complete fetch cycle and returns the merged feed,
    /// newest first.
    ///
    /// Accounts are fetched concurrently and independently; an account
    /// that fails contributes an empty sequence without affecting its
    /// siblings. A cycle where every account fails is a successful
    /// empty result, not an error — this method cannot fail.
    ///
    /// Cycles triggered while another is in flight run independently:
    /// each works on its own registry snapshot, and credential
    /// write-back is per account, so concurrent cycles and concurrent
    /// registrations cannot corrupt each other.
    pub async fn run_cycle(&self) -> Vec<Email> {
        let accounts = self.registry.snapshot().await;
        if accounts.is_empty() {
            return Vec::new();
        }

        let fetches = join_all(accounts.iter().map(|account| self.fetcher.fetch(account))).await;

        let mut feed = Vec::new();
        for (account, fetch) in accounts.iter().zip(fetches) {
            if let Some(credential) = fetch.refreshed {
                self.registry
                    .update_credential(&account.address, credential)
                    .await;
            }
            feed.extend(fetch.emails);
        }

        // Stable sort: date ties keep registry/partition order.
        feed.sort_by(|a, b| b.date.cmp(&a.date));
        feed.truncate(self.max_feed);

        tracing::info!(
            emails = feed.len(),
            accounts = accounts.len(),
            "fetch cycle complete"
        );
        feed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Credential, MessageId, PartitionQuery};
    use crate::providers::{
        MailboxProvider, ProviderError, RawMessageDetail, RawMessageRef, Result, Session,
    };
    use async_trait::async_trait;

    /// Provider that serves one message per account token, dated by the
    /// token's position in `dates`.
    struct PerAccountProvider {
        /// (access token, message id, epoch millis); empty millis slot
        /// means the account's credential is rejected.
        accounts: Vec<(String, String, Option<i64>)>,
    }

    #[async_trait]
    impl MailboxProvider for PerAccountProvider {
        async fn authorize(&self, credential: &Credential) -> Result<Session> {
            let known = self
                .accounts
                .iter()
                .find(|(token, _, _)| *token == credential.access_token);
            match known {
                Some((_, _, Some(_))) => Ok(Session {
                    access_token: credential.access_token.clone(),
                    refreshed: None,
                }),
                _ => Err(ProviderError::Authentication("revoked".to_string())),
            }
        }

        async fn list(
            &self,
            session: &Session,
            query: &PartitionQuery,
        ) -> Result<Vec<RawMessageRef>> {
            Ok(self
                .accounts
                .iter()
                .filter(|(token, _, _)| *token == session.access_token)
                .map(|(_, id, _)| RawMessageRef {
                    id: MessageId::from(id.as_str()),
                    partition: query.tag.clone(),
                })
                .collect())
        }

        async fn get_detail(&self, session: &Session, id: &MessageId) -> Result<RawMessageDetail> {
            let (_, _, millis) = self
                .accounts
                .iter()
                .find(|(token, mid, _)| *token == session.access_token && *mid == id.0)
                .ok_or_else(|| ProviderError::NotFound(id.0.clone()))?;
            Ok(RawMessageDetail {
                id: id.clone(),
                label_ids: vec!["INBOX".to_string()],
                snippet: None,
                internal_date_ms: *millis,
                headers: vec![],
            })
        }
    }

    fn credential(token: &str) -> Credential {
        Credential {
            access_token: token.to_string(),
            refresh_token: None,
            expires_at: None,
        }
    }

    async fn registry_with(accounts: &[(&str, &str)]) -> Arc<AccountRegistry> {
        let registry = Arc::new(AccountRegistry::new());
        for (address, token) in accounts {
            registry.register(*address, credential(token)).await;
        }
        registry
    }

    fn aggregator(
        registry: Arc<AccountRegistry>,
        provider: PerAccountProvider,
        max_feed: usize,
    ) -> Aggregator {
        let fetcher = AccountFetcher::new(
            Arc::new(provider),
            vec![PartitionQuery::new("in:inbox", "INBOX")],
        );
        Aggregator::new(registry, fetcher, max_feed)
    }

    #[tokio::test]
    async fn empty_registry_yields_empty_feed() {
        let registry = Arc::new(AccountRegistry::new());
        let provider = PerAccountProvider { accounts: vec![] };
        assert!(aggregator(registry, provider, 100).run_cycle().await.is_empty());
    }

    #[tokio::test]
    async fn feed_is_sorted_newest_first() {
        let registry = registry_with(&[("a@x.com", "ta"), ("b@y.com", "tb")]).await;
        let provider = PerAccountProvider {
            accounts: vec![
                ("ta".to_string(), "m-old".to_string(), Some(1_000_000_000_000)),
                ("tb".to_string(), "m-new".to_string(), Some(2_000_000_000_000)),
            ],
        };

        let feed = aggregator(registry, provider, 100).run_cycle().await;

        let ids: Vec<_> = feed.iter().map(|e| e.id.0.as_str()).collect();
        assert_eq!(ids, vec!["m-new", "m-old"]);
        for pair in feed.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }
    }

    #[tokio::test]
    async fn failed_account_does_not_block_others() {
        let registry = registry_with(&[("dead@x.com", "t-dead"), ("live@y.com", "t-live")]).await;
        let provider = PerAccountProvider {
            accounts: vec![
                ("t-dead".to_string(), "m-1".to_string(), None),
                ("t-live".to_string(), "m-2".to_string(), Some(1_714_564_800_000)),
            ],
        };

        let feed = aggregator(registry, provider, 100).run_cycle().await;

        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].account, "live@y.com");
    }

    #[tokio::test]
    async fn feed_is_capped() {
        let registry = registry_with(&[("a@x.com", "ta"), ("b@y.com", "tb")]).await;
        let provider = PerAccountProvider {
            accounts: vec![
                ("ta".to_string(), "m-1".to_string(), Some(3_000_000_000_000)),
                ("tb".to_string(), "m-2".to_string(), Some(2_000_000_000_000)),
            ],
        };

        let feed = aggregator(registry, provider, 1).run_cycle().await;

        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id.0, "m-1");
    }
}
