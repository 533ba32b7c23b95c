//! RunMeteredOperationHandler - the credit debit protocol.
//!
//! Wraps one paid external call (AI gateway, scrape) in the
//! read-check-work-debit sequence:
//!
//! 1. re-read the ledger and account
//! 2. evaluate entitlement; deny before spending on the external call
//! 3. run the external work
//! 4. on success only, debit through the store's atomic conditional
//!    increment
//!
//! Billing follows delivery strictly: failed or timed-out work debits
//! nothing, and a debit that fails after successful work is a logged
//! anomaly, never an error for the caller who already got their result.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::entitlement::{
    evaluate, feature_config, CreditsRemaining, DenialReason, FeatureKey, Metering, WorkError,
};
use crate::domain::foundation::AccountId;
use crate::ports::{AccountStore, DebitOutcome, LedgerStore};

/// One metered operation request.
#[derive(Debug, Clone)]
pub struct MeteredRequest {
    pub account_id: AccountId,
    pub feature: FeatureKey,
    /// Credits this use costs. 1 for most operations; translation passes
    /// the number of target languages.
    pub units: u32,
}

impl MeteredRequest {
    /// A single-unit operation.
    pub fn new(account_id: AccountId, feature: FeatureKey) -> Self {
        Self {
            account_id,
            feature,
            units: 1,
        }
    }

    /// Scale the cost for operations priced per input unit.
    pub fn with_units(mut self, units: u32) -> Self {
        self.units = units;
        self
    }
}

/// Successful metered operation.
#[derive(Debug, Clone)]
pub struct MeteredOutcome<T> {
    /// What the external work produced.
    pub value: T,
    /// Credits actually recorded (0 if the post-work debit was lost to an
    /// anomaly, or the feature is unmetered).
    pub credits_debited: u32,
    pub remaining: CreditsRemaining,
}

/// Errors from the metered operation runner.
#[derive(Debug, Clone, Error)]
pub enum MeteredError {
    /// Entitlement denied; the external work was never started.
    #[error("operation denied: {}", .0.message())]
    Denied(DenialReason),

    /// The external paid work failed; nothing was debited.
    #[error(transparent)]
    Work(WorkError),

    /// A metered request must cost at least one credit.
    #[error("metered operation requested zero units")]
    ZeroUnits,

    /// No account exists with this id.
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    /// The account has no usage ledger row.
    #[error("usage ledger not found for account: {0}")]
    LedgerNotFound(AccountId),

    /// Underlying storage failed before the work ran.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<crate::domain::foundation::DomainError> for MeteredError {
    fn from(err: crate::domain::foundation::DomainError) -> Self {
        MeteredError::Storage(err.to_string())
    }
}

/// Runs metered operations under the credit debit protocol.
pub struct RunMeteredOperationHandler {
    accounts: Arc<dyn AccountStore>,
    ledgers: Arc<dyn LedgerStore>,
}

impl RunMeteredOperationHandler {
    pub fn new(accounts: Arc<dyn AccountStore>, ledgers: Arc<dyn LedgerStore>) -> Self {
        Self { accounts, ledgers }
    }

    /// Executes `work` if the account is entitled, then debits on success.
    ///
    /// `work` is the opaque paid call; it is only invoked after the
    /// entitlement check passes, so a denial costs nothing. No lock is held
    /// while it runs.
    pub async fn handle<T, F, Fut>(
        &self,
        request: MeteredRequest,
        work: F,
    ) -> Result<MeteredOutcome<T>, MeteredError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, WorkError>>,
    {
        let account = self
            .accounts
            .get(&request.account_id)
            .await?
            .ok_or(MeteredError::AccountNotFound(request.account_id))?;

        let ledger = self
            .ledgers
            .get(&request.account_id)
            .await?
            .ok_or(MeteredError::LedgerNotFound(request.account_id))?;

        let decision = evaluate(request.feature, &account, &ledger);
        if !decision.allowed {
            let reason = decision.reason.unwrap_or(DenialReason::CreditsExhausted);
            debug!(
                account_id = %request.account_id,
                feature = %request.feature,
                "metered operation denied"
            );
            return Err(MeteredError::Denied(reason));
        }

        let category = match feature_config(request.feature).metering {
            Metering::Credits(category) => Some(category),
            Metering::None => None,
        };

        if category.is_some() {
            if request.units == 0 {
                return Err(MeteredError::ZeroUnits);
            }
            // Multi-unit requests need the full cost available up front,
            // not just a nonzero balance.
            if !ledger.is_unlimited() && ledger.remaining_credits() < request.units {
                return Err(MeteredError::Denied(DenialReason::CreditsExhausted));
            }
        }

        // The paid call. Failures propagate with nothing debited.
        let value = work().await.map_err(MeteredError::Work)?;

        let Some(category) = category else {
            return Ok(MeteredOutcome {
                value,
                credits_debited: 0,
                remaining: ledger.remaining(),
            });
        };

        match self
            .ledgers
            .debit_within_limit(&request.account_id, category, request.units)
            .await
        {
            Ok(DebitOutcome::Applied { remaining }) => Ok(MeteredOutcome {
                value,
                credits_debited: request.units,
                remaining,
            }),
            Ok(DebitOutcome::InsufficientCredits) => {
                // A concurrent request spent the credits between our check
                // and the debit. The work already succeeded and was
                // delivered; consumption stays at the ceiling.
                warn!(
                    account_id = %request.account_id,
                    feature = %request.feature,
                    units = request.units,
                    "billing anomaly: debit rejected after successful work"
                );
                Ok(MeteredOutcome {
                    value,
                    credits_debited: 0,
                    remaining: CreditsRemaining::Credits(0),
                })
            }
            Err(err) => {
                warn!(
                    account_id = %request.account_id,
                    feature = %request.feature,
                    units = request.units,
                    error = %err,
                    "billing anomaly: ledger write failed after successful work"
                );
                Ok(MeteredOutcome {
                    value,
                    credits_debited: 0,
                    remaining: ledger.remaining(),
                })
            }
        }
    }
}
