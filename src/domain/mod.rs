//! Domain layer types for the unified inbox service.
//!
//! Accounts and credentials, mailbox partitions, the label
//! classification, and the canonical [`Email`] entity produced by every
//! fetch cycle.

mod account;
mod email;
mod label;
mod partition;
mod types;

pub use account::{Account, Credential};
pub use email::Email;
pub use label::Label;
pub use partition::PartitionQuery;
pub use types::MessageId;
