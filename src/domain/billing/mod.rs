//! Billing domain module.
//!
//! Ingests payment-provider webhooks and reconciles tier and credit-limit
//! state with the provider's view of truth.
//!
//! # Module Structure
//!
//! - `event` - PaymentEvent wire types
//! - `verifier` - HMAC signature verification of webhook payloads
//! - `processor` - exactly-once event processing
//! - `reconciler` - plan-change application
//! - `webhook_errors` - error taxonomy with retry semantics

mod event;
mod processor;
mod reconciler;
mod verifier;
mod webhook_errors;

pub use event::{PaymentEvent, PaymentEventType};
pub use processor::{IdempotentWebhookProcessor, PaymentEventHandler};
pub use reconciler::PlanReconciler;
pub use verifier::{PaymentWebhookVerifier, SignatureHeader};
pub use webhook_errors::WebhookError;

#[cfg(test)]
pub use event::PaymentEventBuilder;
#[cfg(test)]
pub use verifier::compute_test_signature;
