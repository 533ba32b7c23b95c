//! PostgreSQL implementations of the persistence ports.
//!
//! All adapters use sqlx with connection pooling. The ledger adapter
//! expresses the debit ceiling inside a single conditional UPDATE so the
//! database serializes concurrent debits for the same account.

mod account_store;
mod ledger_store;
mod webhook_events;

pub use account_store::PostgresAccountStore;
pub use ledger_store::PostgresLedgerStore;
pub use webhook_events::{PostgresCreditGrantStore, PostgresWebhookEventRepository};
