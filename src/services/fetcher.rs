//! Per-account fetch pipeline.
//!
//! One [`AccountFetcher::fetch`] call runs the whole pipeline for a
//! single account: apply the credential, list every configured
//! partition concurrently, dedup within the account, retrieve details
//! concurrently, and normalize. Failures are isolated at every level —
//! a bad partition loses that partition, a bad message loses that
//! message, a bad credential loses the account. Nothing propagates.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use crate::domain::{Account, Credential, Email, PartitionQuery};
use crate::providers::MailboxProvider;
use crate::services::normalizer;

/// Result of fetching one account.
#[derive(Debug, Default)]
pub struct AccountFetch {
    /// Normalized emails from every partition that succeeded.
    pub emails: Vec<Email>,
    /// Replacement credential when the fetch silently refreshed one.
    pub refreshed: Option<Credential>,
}

/// Fetches and normalizes the inbox contents of a single account.
pub struct AccountFetcher {
    provider: Arc<dyn MailboxProvider>,
    partitions: Vec<PartitionQuery>,
}

impl AccountFetcher {
    /// Creates a fetcher over the given provider and partition set.
    pub fn new(provider: Arc<dyn MailboxProvider>, partitions: Vec<PartitionQuery>) -> Self {
        Self {
            provider,
            partitions,
        }
    }

    /// Runs the per-account pipeline. Infallible: any failure degrades
    /// the result rather than surfacing an error.
    pub async fn fetch(&self, account: &Account) -> AccountFetch {
        let session = match self.provider.authorize(&account.credential).await {
            Ok(session) => session,
            Err(error) => {
                tracing::warn!(
                    account = %account.address,
                    %error,
                    "credential unusable, account contributes nothing this cycle"
                );
                return AccountFetch::default();
            }
        };

        // Partition fan-out. join_all keeps results in partition order,
        // so dedup below is deterministic.
        let listings = join_all(
            self.partitions
                .iter()
                .map(|query| self.provider.list(&session, query)),
        )
        .await;

        let mut seen = HashSet::new();
        let mut refs = Vec::new();
        for (query, listing) in self.partitions.iter().zip(listings) {
            match listing {
                Ok(batch) => {
                    for message_ref in batch {
                        if seen.insert(message_ref.id.clone()) {
                            refs.push(message_ref);
                        }
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        account = %account.address,
                        partition = %query.tag,
                        %error,
                        "partition listing failed, skipping"
                    );
                }
            }
        }

        // Detail fan-out over the deduped id set.
        let details = join_all(
            refs.iter()
                .map(|message_ref| self.provider.get_detail(&session, &message_ref.id)),
        )
        .await;

        let mut emails = Vec::with_capacity(refs.len());
        for (message_ref, detail) in refs.iter().zip(details) {
            match detail {
                Ok(detail) => emails.push(normalizer::normalize(&account.address, &detail)),
                Err(error) => {
                    tracing::debug!(
                        account = %account.address,
                        message = %message_ref.id,
                        %error,
                        "message detail fetch failed, dropping message"
                    );
                }
            }
        }

        AccountFetch {
            emails,
            refreshed: session.refreshed,
        }
    }
}
