//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AccountStore` - account persistence and external-ref lookup
//! - `LedgerStore` - usage ledger persistence with the atomic
//!   increment-with-ceiling primitive
//! - `WebhookEventRepository` - payment webhook idempotency tracking
//! - `CreditGrantStore` - one-shot transaction claims for credit packs

mod account_store;
mod credit_grant_store;
mod ledger_store;
mod webhook_event_repository;

pub use account_store::AccountStore;
pub use credit_grant_store::{CreditGrantStore, GrantClaim};
pub use ledger_store::{DebitOutcome, LedgerStore};
pub use webhook_event_repository::{
    SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookResult,
};
