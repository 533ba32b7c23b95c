//! In-memory port implementations.
//!
//! Used by tests and local development. Atomicity comes from holding the
//! map's write lock across the check-and-mutate, which serializes
//! concurrent debits the same way the database's conditional UPDATE does.

mod account_store;
mod ledger_store;
mod webhook_events;

pub use account_store::InMemoryAccountStore;
pub use ledger_store::InMemoryLedgerStore;
pub use webhook_events::{InMemoryCreditGrantStore, InMemoryWebhookEventRepository};
