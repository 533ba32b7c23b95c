//! Webhook processor - Orchestrates idempotent webhook event handling.
//!
//! Coordination layer between the payment provider and the plan
//! reconciler, ensuring each event is applied exactly once.
//!
//! ## Design
//!
//! 1. Check if the event was already processed (idempotency)
//! 2. Hand the event to the handler
//! 3. Record success and ignored outcomes; failures are NOT recorded, so
//!    the provider's redelivery gets a real retry instead of a skip
//!
//! ## Race Condition Handling
//!
//! When duplicate deliveries arrive simultaneously:
//! - First to save wins (database PRIMARY KEY constraint)
//! - Others get `AlreadyExists` and return `AlreadyProcessed`

use async_trait::async_trait;

use crate::ports::{SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookResult};

use super::event::PaymentEvent;
use super::webhook_errors::WebhookError;

/// Handler that applies a payment event to account and ledger state.
///
/// Implementations must be idempotent for subscription events and use a
/// dedup claim for additive grants; the processor's event-id record is the
/// outer defense, not the only one.
#[async_trait]
pub trait PaymentEventHandler: Send + Sync {
    /// Handles the payment event.
    ///
    /// Returns `Ok(())` on success.
    /// Returns `Err(WebhookError::Ignored(_))` if the event should be
    /// acknowledged but not processed. Other `Err` variants are failures.
    async fn handle(&self, event: &PaymentEvent) -> Result<(), WebhookError>;
}

/// Processes webhook events with idempotency guarantees.
///
/// This is the main entry point for webhook processing.
pub struct IdempotentWebhookProcessor<R: WebhookEventRepository, H: PaymentEventHandler> {
    repository: R,
    handler: H,
}

impl<R: WebhookEventRepository, H: PaymentEventHandler> IdempotentWebhookProcessor<R, H> {
    /// Creates a new processor with the given repository and handler.
    pub fn new(repository: R, handler: H) -> Self {
        Self {
            repository,
            handler,
        }
    }

    /// Process a webhook event exactly once.
    ///
    /// # Returns
    ///
    /// - `Ok(WebhookResult::Processed)` - Event was processed successfully
    /// - `Ok(WebhookResult::AlreadyProcessed)` - Event was already processed
    /// - `Err(_)` - Processing failed
    pub async fn process(&self, event: PaymentEvent) -> Result<WebhookResult, WebhookError> {
        // 1. Check if already processed
        if self.repository.find_by_event_id(&event.id).await?.is_some() {
            return Ok(WebhookResult::AlreadyProcessed);
        }

        // 2. Process the event
        let result = self.handler.handle(&event).await;

        // 3. Build the record. Failures leave no record: the provider will
        // redeliver and the retry must not be skipped.
        let payload = serde_json::to_value(&event)
            .map_err(|e| WebhookError::ParseError(format!("Failed to serialize event: {}", e)))?;
        let record = match result {
            Ok(()) => WebhookEventRecord::success(&event.id, &event.event_type, payload),
            Err(WebhookError::Ignored(reason)) => {
                WebhookEventRecord::ignored(&event.id, &event.event_type, reason, payload)
            }
            Err(e) => {
                tracing::error!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    error = %e,
                    "payment event processing failed"
                );
                return Err(e);
            }
        };

        // 4. Save the record (handles race conditions)
        match self.repository.save(record).await? {
            SaveResult::Inserted => {
                // Ignored events are still "processed" from the idempotency
                // perspective
                Ok(WebhookResult::Processed)
            }
            SaveResult::AlreadyExists => {
                // Lost the race, another delivery already handled it
                Ok(WebhookResult::AlreadyProcessed)
            }
        }
    }
}
