//! In-memory implementation of LedgerStore.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entitlement::{CreditCategory, UsageLedger};
use crate::domain::foundation::{AccountId, DomainError};
use crate::ports::{DebitOutcome, LedgerStore};

/// In-memory ledger store keyed by account id.
///
/// `debit_within_limit` holds the write lock across the ceiling check and
/// the increment, which is the in-process equivalent of the database's
/// single conditional UPDATE.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    ledgers: RwLock<HashMap<AccountId, UsageLedger>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn get(&self, account_id: &AccountId) -> Result<Option<UsageLedger>, DomainError> {
        Ok(self.ledgers.read().await.get(account_id).cloned())
    }

    async fn create(&self, account_id: &AccountId, credit_limit: u32) -> Result<(), DomainError> {
        self.ledgers
            .write()
            .await
            .entry(*account_id)
            .or_insert_with(|| UsageLedger::new(*account_id, credit_limit));
        Ok(())
    }

    async fn debit_within_limit(
        &self,
        account_id: &AccountId,
        category: CreditCategory,
        amount: u32,
    ) -> Result<DebitOutcome, DomainError> {
        let mut ledgers = self.ledgers.write().await;
        let ledger = ledgers
            .get_mut(account_id)
            .ok_or_else(|| DomainError::ledger_not_found(account_id))?;

        if !ledger.is_unlimited() && ledger.total_consumed() + amount > ledger.credit_limit {
            return Ok(DebitOutcome::InsufficientCredits);
        }

        ledger.record(category, amount);
        Ok(DebitOutcome::Applied {
            remaining: ledger.remaining(),
        })
    }

    async fn set_credit_limit(
        &self,
        account_id: &AccountId,
        limit: u32,
    ) -> Result<(), DomainError> {
        let mut ledgers = self.ledgers.write().await;
        let ledger = ledgers
            .get_mut(account_id)
            .ok_or_else(|| DomainError::ledger_not_found(account_id))?;
        ledger.credit_limit = limit;
        Ok(())
    }

    async fn add_to_credit_limit(
        &self,
        account_id: &AccountId,
        amount: u32,
    ) -> Result<(), DomainError> {
        let mut ledgers = self.ledgers.write().await;
        let ledger = ledgers
            .get_mut(account_id)
            .ok_or_else(|| DomainError::ledger_not_found(account_id))?;
        ledger.credit_limit += amount;
        Ok(())
    }
}
