//! CheckEntitlementHandler - Query handler for entitlement decisions.

use std::sync::Arc;

use crate::domain::entitlement::{evaluate, EntitlementDecision, EntitlementError, FeatureKey};
use crate::domain::foundation::AccountId;
use crate::ports::{AccountStore, LedgerStore};

/// Query for one feature's entitlement.
#[derive(Debug, Clone)]
pub struct CheckEntitlementQuery {
    pub account_id: AccountId,
    pub feature: FeatureKey,
}

/// Handler answering "may this account use this feature right now?".
///
/// This is the most frequently called query: the dashboard issues it for
/// every gated button it renders. It never mutates the ledger.
pub struct CheckEntitlementHandler {
    accounts: Arc<dyn AccountStore>,
    ledgers: Arc<dyn LedgerStore>,
}

impl CheckEntitlementHandler {
    pub fn new(accounts: Arc<dyn AccountStore>, ledgers: Arc<dyn LedgerStore>) -> Self {
        Self { accounts, ledgers }
    }

    pub async fn handle(
        &self,
        query: CheckEntitlementQuery,
    ) -> Result<EntitlementDecision, EntitlementError> {
        let account = self
            .accounts
            .get(&query.account_id)
            .await?
            .ok_or(EntitlementError::AccountNotFound(query.account_id))?;

        let ledger = self
            .ledgers
            .get(&query.account_id)
            .await?
            .ok_or(EntitlementError::LedgerNotFound(query.account_id))?;

        Ok(evaluate(query.feature, &account, &ledger))
    }
}
