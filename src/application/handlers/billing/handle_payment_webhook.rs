//! HandlePaymentWebhookHandler - verifies and applies payment webhooks.
//!
//! The full ingestion path: signature verification, exactly-once
//! processing, plan reconciliation.

use std::sync::Arc;

use tracing::info;

use crate::domain::billing::{
    IdempotentWebhookProcessor, PaymentWebhookVerifier, PlanReconciler, WebhookError,
};
use crate::domain::entitlement::TierCatalog;
use crate::ports::{
    AccountStore, CreditGrantStore, LedgerStore, WebhookEventRepository, WebhookResult,
};

/// Command carrying one raw webhook delivery.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    pub payload: Vec<u8>,
    pub signature: String,
}

/// Handler for raw payment webhook deliveries.
pub struct HandlePaymentWebhookHandler {
    verifier: Arc<PaymentWebhookVerifier>,
    processor: IdempotentWebhookProcessor<Arc<dyn WebhookEventRepository>, PlanReconciler>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        verifier: Arc<PaymentWebhookVerifier>,
        events: Arc<dyn WebhookEventRepository>,
        accounts: Arc<dyn AccountStore>,
        ledgers: Arc<dyn LedgerStore>,
        grants: Arc<dyn CreditGrantStore>,
        catalog: &'static TierCatalog,
    ) -> Self {
        let reconciler = PlanReconciler::new(accounts, ledgers, grants, catalog);
        Self {
            verifier,
            processor: IdempotentWebhookProcessor::new(events, reconciler),
        }
    }

    pub async fn handle(
        &self,
        command: HandlePaymentWebhookCommand,
    ) -> Result<WebhookResult, WebhookError> {
        let event = self
            .verifier
            .verify_and_parse(&command.payload, &command.signature)?;

        info!(
            event_id = %event.id,
            event_type = %event.event_type,
            "payment webhook received"
        );

        self.processor.process(event).await
    }
}
