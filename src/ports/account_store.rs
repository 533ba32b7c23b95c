//! AccountStore port - account persistence.

use async_trait::async_trait;

use crate::domain::entitlement::{Account, PlanTier};
use crate::domain::foundation::{AccountId, DomainError};

/// Port for storing and retrieving accounts.
///
/// Implementations may store accounts in PostgreSQL or memory.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fetch an account by id.
    async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError>;

    /// Fetch an account by the external reference payment events carry
    /// (the billing email).
    async fn find_by_external_ref(&self, external_ref: &str)
        -> Result<Option<Account>, DomainError>;

    /// Insert or replace an account record.
    async fn upsert(&self, account: &Account) -> Result<(), DomainError>;

    /// Overwrite the account's tier.
    ///
    /// Fails with `AccountNotFound` if the account does not exist.
    async fn set_tier(&self, id: &AccountId, tier: PlanTier) -> Result<(), DomainError>;

    /// Mark the one-shot sell-wizard pass as used.
    ///
    /// Idempotent: marking an already-used pass is a no-op.
    async fn mark_first_item_pass_used(&self, id: &AccountId) -> Result<(), DomainError>;
}
