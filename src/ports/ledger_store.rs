//! LedgerStore port - usage ledger persistence.
//!
//! The one primitive that matters here is `debit_within_limit`: an atomic
//! conditional increment. Two concurrent requests from the same account can
//! both read "1 credit remaining"; only the storage layer can serialize the
//! actual spend. Implementations must express the ceiling check and the
//! increment as a single atomic operation, never read-then-write.

use async_trait::async_trait;

use crate::domain::entitlement::{CreditCategory, CreditsRemaining, UsageLedger};
use crate::domain::foundation::{AccountId, DomainError};

/// Outcome of an atomic conditional debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// The increment was applied; pooled total stayed at or under the limit
    /// (or the account is unlimited).
    Applied { remaining: CreditsRemaining },
    /// Applying the increment would have pushed the pooled total past the
    /// limit; nothing was recorded.
    InsufficientCredits,
}

impl DebitOutcome {
    /// True when credits were recorded.
    pub fn is_applied(&self) -> bool {
        matches!(self, DebitOutcome::Applied { .. })
    }
}

/// Port for storing and mutating usage ledgers.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetch the ledger snapshot for an account.
    async fn get(&self, account_id: &AccountId) -> Result<Option<UsageLedger>, DomainError>;

    /// Create a zeroed ledger with the given limit. No-op if one exists.
    async fn create(&self, account_id: &AccountId, credit_limit: u32) -> Result<(), DomainError>;

    /// Atomically add `amount` to `category` if the resulting pooled total
    /// stays at or under `credit_limit`.
    ///
    /// Unlimited accounts (limit at or above the sentinel) always apply;
    /// their counters still advance for accounting.
    async fn debit_within_limit(
        &self,
        account_id: &AccountId,
        category: CreditCategory,
        amount: u32,
    ) -> Result<DebitOutcome, DomainError>;

    /// Overwrite the credit limit (plan changes: full overwrite, not
    /// additive, so downgrades bite even mid-period).
    async fn set_credit_limit(&self, account_id: &AccountId, limit: u32)
        -> Result<(), DomainError>;

    /// Add to the credit limit (credit-pack purchases).
    async fn add_to_credit_limit(&self, account_id: &AccountId, amount: u32)
        -> Result<(), DomainError>;
}
