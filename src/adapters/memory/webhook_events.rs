//! In-memory implementations of the webhook idempotency ports.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::{
    CreditGrantStore, GrantClaim, SaveResult, WebhookEventRecord, WebhookEventRepository,
};

/// In-memory webhook event repository keyed by event id.
#[derive(Default)]
pub struct InMemoryWebhookEventRepository {
    records: RwLock<HashMap<String, WebhookEventRecord>>,
}

impl InMemoryWebhookEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WebhookEventRepository for InMemoryWebhookEventRepository {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        Ok(self.records.read().await.get(event_id).cloned())
    }

    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.event_id) {
            Ok(SaveResult::AlreadyExists)
        } else {
            records.insert(record.event_id.clone(), record);
            Ok(SaveResult::Inserted)
        }
    }

    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| r.processed_at >= timestamp);
        Ok((before - records.len()) as u64)
    }
}

/// In-memory credit grant store keyed by transaction id.
#[derive(Default)]
pub struct InMemoryCreditGrantStore {
    claimed: RwLock<HashSet<String>>,
}

impl InMemoryCreditGrantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CreditGrantStore for InMemoryCreditGrantStore {
    async fn claim(&self, transaction_id: &str) -> Result<GrantClaim, DomainError> {
        let mut claimed = self.claimed.write().await;
        if claimed.insert(transaction_id.to_string()) {
            Ok(GrantClaim::Claimed)
        } else {
            Ok(GrantClaim::AlreadyGranted)
        }
    }
}
