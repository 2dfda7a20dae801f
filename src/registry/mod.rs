//! In-memory store of connected accounts.
//!
//! The registry is the only mutable shared resource in the pipeline.
//! Fetch cycles read owned snapshots; writes happen per account, so a
//! cycle finishing late can never clobber a registration that raced it.
//! Nothing is persisted — accounts are gone on restart by design.

use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{Account, Credential};

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The account was not known and has been added.
    Added,
    /// The address was already registered; the stored credential wins
    /// and the call was a no-op.
    AlreadyConnected,
}

/// Insertion-ordered store of connected accounts.
///
/// Insertion order is significant: it becomes the grouping order of the
/// merged feed when dates tie.
#[derive(Debug, Default)]
pub struct AccountRegistry {
    accounts: RwLock<Vec<Account>>,
}

impl AccountRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account, keeping the first-connected credential on
    /// duplicate addresses.
    ///
    /// Idempotent: re-authorizing an address that is already connected
    /// is a no-op, observable through the returned [`Registration`].
    pub async fn register(
        &self,
        address: impl Into<String>,
        credential: Credential,
    ) -> Registration {
        let address = address.into();
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.address == address) {
            tracing::info!(account = %address, "account already connected");
            return Registration::AlreadyConnected;
        }
        accounts.push(Account::new(&address, credential));
        tracing::info!(account = %address, "account connected");
        Registration::Added
    }

    /// Returns an owned snapshot of all accounts in insertion order.
    ///
    /// The snapshot is consistent: a registration racing this call is
    /// either fully visible or not at all.
    pub async fn snapshot(&self) -> Vec<Account> {
        self.accounts.read().await.clone()
    }

    /// Replaces the stored credential for one account.
    ///
    /// Used after a fetch cycle silently refreshed a token. Unknown
    /// addresses are ignored; returns whether a write happened.
    pub async fn update_credential(&self, address: &str, credential: Credential) -> bool {
        let mut accounts = self.accounts.write().await;
        match accounts.iter_mut().find(|a| a.address == address) {
            Some(account) => {
                account.credential = credential;
                account.last_refreshed_at = Utc::now();
                tracing::debug!(account = %address, "credential refreshed");
                true
            }
            None => false,
        }
    }

    /// Number of connected accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Whether no accounts are connected.
    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}
