//! RedeemWizardPassHandler - consumes the one-shot sell-wizard pass.
//!
//! The evaluator only signals that the pass is available; it never spends
//! it. Callers who choose to run the wizard's first use unmetered redeem
//! the pass here, which flips the per-account flag.

use std::sync::Arc;

use tracing::info;

use crate::domain::entitlement::{evaluate, EntitlementError, FeatureKey};
use crate::domain::foundation::AccountId;
use crate::ports::{AccountStore, LedgerStore};

/// Command to redeem the sell-wizard grace pass.
#[derive(Debug, Clone)]
pub struct RedeemWizardPassCommand {
    pub account_id: AccountId,
}

/// Handler for redeeming the first-listing grace pass.
pub struct RedeemWizardPassHandler {
    accounts: Arc<dyn AccountStore>,
    ledgers: Arc<dyn LedgerStore>,
}

impl RedeemWizardPassHandler {
    pub fn new(accounts: Arc<dyn AccountStore>, ledgers: Arc<dyn LedgerStore>) -> Self {
        Self { accounts, ledgers }
    }

    /// Redeems the pass if it is active.
    ///
    /// Returns `true` when the pass was active and is now consumed, `false`
    /// when no pass was available (paid tier, or already used). Redeeming
    /// twice consumes once.
    pub async fn handle(
        &self,
        command: RedeemWizardPassCommand,
    ) -> Result<bool, EntitlementError> {
        let account = self
            .accounts
            .get(&command.account_id)
            .await?
            .ok_or(EntitlementError::AccountNotFound(command.account_id))?;

        let ledger = self
            .ledgers
            .get(&command.account_id)
            .await?
            .ok_or(EntitlementError::LedgerNotFound(command.account_id))?;

        let decision = evaluate(FeatureKey::SellWizard, &account, &ledger);
        if !decision.free_pass_active {
            return Ok(false);
        }

        self.accounts
            .mark_first_item_pass_used(&command.account_id)
            .await?;
        info!(account_id = %command.account_id, "sell-wizard grace pass redeemed");
        Ok(true)
    }
}
