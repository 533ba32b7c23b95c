//! In-memory implementation of AccountStore.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entitlement::{Account, PlanTier};
use crate::domain::foundation::{AccountId, DomainError, Timestamp};
use crate::ports::AccountStore;

/// In-memory account store keyed by account id.
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn find_by_external_ref(
        &self,
        external_ref: &str,
    ) -> Result<Option<Account>, DomainError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.external_ref == external_ref)
            .cloned())
    }

    async fn upsert(&self, account: &Account) -> Result<(), DomainError> {
        self.accounts
            .write()
            .await
            .insert(account.id, account.clone());
        Ok(())
    }

    async fn set_tier(&self, id: &AccountId, tier: PlanTier) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(id)
            .ok_or_else(|| DomainError::account_not_found(id))?;
        account.tier = tier;
        account.updated_at = Timestamp::now();
        Ok(())
    }

    async fn mark_first_item_pass_used(&self, id: &AccountId) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(id)
            .ok_or_else(|| DomainError::account_not_found(id))?;
        account.first_item_pass_used = true;
        account.updated_at = Timestamp::now();
        Ok(())
    }
}
