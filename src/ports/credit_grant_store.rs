//! CreditGrantStore port - one-shot claims on credit-pack transactions.
//!
//! Credit packs are the one additive plan change, so deterministic replay
//! does not protect them: applying the same purchase event twice would
//! double-grant. The claim is recorded before the grant is applied, keyed
//! on the payment provider's transaction id.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// Result of attempting to claim a transaction id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantClaim {
    /// First time this transaction was seen; the caller should apply the
    /// grant.
    Claimed,
    /// The transaction was already claimed; a replayed delivery.
    AlreadyGranted,
}

/// Port for claiming credit-pack transactions exactly once.
///
/// Implementations should rely on a uniqueness constraint (PRIMARY KEY on
/// the transaction id) so concurrent claims resolve to one winner.
#[async_trait]
pub trait CreditGrantStore: Send + Sync {
    /// Claim a transaction id. Returns `Claimed` to exactly one caller per
    /// id, `AlreadyGranted` to every other.
    async fn claim(&self, transaction_id: &str) -> Result<GrantClaim, DomainError>;
}
