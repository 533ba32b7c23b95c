//! GetUsageHandler - Query handler for the usage ledger snapshot.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::entitlement::{CreditsRemaining, EntitlementError, UsageLedger};
use crate::domain::foundation::AccountId;
use crate::ports::LedgerStore;

/// Query for an account's usage snapshot.
#[derive(Debug, Clone)]
pub struct GetUsageQuery {
    pub account_id: AccountId,
}

/// Read model of the usage ledger for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageView {
    pub price_checks_used: u32,
    pub optimisations_used: u32,
    pub photo_studio_used: u32,
    pub total_consumed: u32,
    pub credit_limit: u32,
    pub remaining: CreditsRemaining,
}

impl From<UsageLedger> for UsageView {
    fn from(ledger: UsageLedger) -> Self {
        Self {
            price_checks_used: ledger.price_checks_used,
            optimisations_used: ledger.optimisations_used,
            photo_studio_used: ledger.photo_studio_used,
            total_consumed: ledger.total_consumed(),
            credit_limit: ledger.credit_limit,
            remaining: ledger.remaining(),
        }
    }
}

/// Handler for reading an account's consumption and remaining credits.
pub struct GetUsageHandler {
    ledgers: Arc<dyn LedgerStore>,
}

impl GetUsageHandler {
    pub fn new(ledgers: Arc<dyn LedgerStore>) -> Self {
        Self { ledgers }
    }

    pub async fn handle(&self, query: GetUsageQuery) -> Result<UsageView, EntitlementError> {
        let ledger = self
            .ledgers
            .get(&query.account_id)
            .await?
            .ok_or(EntitlementError::LedgerNotFound(query.account_id))?;

        Ok(UsageView::from(ledger))
    }
}
