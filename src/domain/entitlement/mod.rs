//! Entitlement domain module.
//!
//! Decides what a reseller account may do right now: tier gating, pooled
//! credit accounting, and the one-shot sell-wizard pass.
//!
//! # Module Structure
//!
//! - `tier` - PlanTier subscription levels
//! - `catalog` - TierCatalog allotments and product mapping
//! - `feature` - FeatureKey and per-feature gating configuration
//! - `ledger` - UsageLedger pooled credit counters
//! - `account` - Account record
//! - `evaluator` - the pure allow/deny decision function

mod account;
mod catalog;
mod errors;
mod evaluator;
mod feature;
mod ledger;
mod tier;

pub use account::Account;
pub use catalog::{ProductMapping, TierCatalog, TierDefinition};
pub use errors::{EntitlementError, WorkError};
pub use evaluator::{evaluate, DenialReason, EntitlementDecision};
pub use feature::{feature_config, FeatureConfig, FeatureKey, Metering};
pub use ledger::{CreditCategory, CreditsRemaining, UsageLedger, UNLIMITED_CREDIT_THRESHOLD};
pub use tier::PlanTier;
