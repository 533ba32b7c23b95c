//! Reseller account record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, Timestamp};

use super::PlanTier;

/// A reseller account.
///
/// The tier is mutated only by plan-change reconciliation (or explicit
/// admin/test action); accounts are never deleted in-band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// External identifier payment events carry (the billing email).
    pub external_ref: String,
    pub tier: PlanTier,
    /// IANA timezone name, used for period boundaries in reporting.
    pub timezone: String,
    /// One-shot flag for the sell-wizard grace pass.
    pub first_item_pass_used: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Account {
    /// Creates a new free-tier account.
    pub fn signup(external_ref: impl Into<String>, timezone: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id: AccountId::new(),
            external_ref: external_ref.into(),
            tier: PlanTier::Free,
            timezone: timezone.into(),
            first_item_pass_used: false,
            created_at: now,
            updated_at: now,
        }
    }
}
