//! Entitlement-specific error types.

use thiserror::Error;

use crate::domain::foundation::{AccountId, DomainError};

/// Errors from entitlement queries and commands.
#[derive(Debug, Clone, Error)]
pub enum EntitlementError {
    /// No account exists with this id.
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    /// The account has no usage ledger row.
    #[error("usage ledger not found for account: {0}")]
    LedgerNotFound(AccountId),

    /// Underlying storage failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<DomainError> for EntitlementError {
    fn from(err: DomainError) -> Self {
        EntitlementError::Storage(err.to_string())
    }
}

/// Failure of the external paid work a metered operation wraps.
///
/// The distinction matters to callers: rate limits invite retry with
/// backoff, quota exhaustion and timeouts are hard failures for this
/// request. None of these ever debit credits.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkError {
    /// The provider rejected the call for request-rate reasons.
    #[error("provider rate limited")]
    RateLimited,

    /// The provider's own quota for us is exhausted.
    #[error("provider quota exhausted")]
    QuotaExhausted,

    /// No response arrived before the deadline. Work the provider completes
    /// after this point is not billed.
    #[error("provider timed out")]
    Timeout,

    /// Any other provider failure, including unparseable responses.
    #[error("provider call failed: {0}")]
    Failed(String),
}

impl WorkError {
    /// True when the caller may reasonably retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkError::RateLimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_is_retryable() {
        assert!(WorkError::RateLimited.is_retryable());
    }

    #[test]
    fn quota_and_timeout_are_not_retryable() {
        assert!(!WorkError::QuotaExhausted.is_retryable());
        assert!(!WorkError::Timeout.is_retryable());
        assert!(!WorkError::Failed("boom".into()).is_retryable());
    }

    #[test]
    fn domain_error_converts_to_storage() {
        let err: EntitlementError = DomainError::database("pool exhausted").into();
        assert!(matches!(err, EntitlementError::Storage(_)));
    }
}
