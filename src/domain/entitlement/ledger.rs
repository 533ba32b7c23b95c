//! Usage ledger: pooled credit counters per account.
//!
//! Categories are accounting labels, not independent quotas. All counters
//! draw down one shared `credit_limit`; exhaustion is evaluated against
//! their sum.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::AccountId;

/// A `credit_limit` at or above this value marks the account unlimited and
/// exempts it from the remaining-credits check entirely.
pub const UNLIMITED_CREDIT_THRESHOLD: u32 = 999_999;

/// Ledger category a metered feature debits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditCategory {
    PriceChecks,
    Optimisations,
    PhotoStudio,
}

impl CreditCategory {
    /// Returns the storage column name for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditCategory::PriceChecks => "price_checks",
            CreditCategory::Optimisations => "optimisations",
            CreditCategory::PhotoStudio => "photo_studio",
        }
    }
}

/// Credits left in the current period, or the unlimited marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "credits")]
pub enum CreditsRemaining {
    Unlimited,
    Credits(u32),
}

/// Per-account snapshot of consumed credits and the shared ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLedger {
    pub account_id: AccountId,
    /// Credits consumed by price checks this period.
    pub price_checks_used: u32,
    /// Credits consumed by listing optimisations this period.
    pub optimisations_used: u32,
    /// Credits consumed by photo-studio operations this period.
    pub photo_studio_used: u32,
    /// Shared ceiling across all categories. Independent of the tier's
    /// default allotment: promotions and credit packs raise it.
    pub credit_limit: u32,
}

impl UsageLedger {
    /// Creates a fresh ledger with zero consumption.
    pub fn new(account_id: AccountId, credit_limit: u32) -> Self {
        Self {
            account_id,
            price_checks_used: 0,
            optimisations_used: 0,
            photo_studio_used: 0,
            credit_limit,
        }
    }

    /// Total credits consumed across all categories.
    pub fn total_consumed(&self) -> u32 {
        self.price_checks_used + self.optimisations_used + self.photo_studio_used
    }

    /// Credits left before the shared ceiling, floored at zero.
    ///
    /// A downgrade can push the limit below consumption; the result is 0,
    /// not an error.
    pub fn remaining_credits(&self) -> u32 {
        self.credit_limit.saturating_sub(self.total_consumed())
    }

    /// Remaining credits with the unlimited marker applied.
    pub fn remaining(&self) -> CreditsRemaining {
        if self.is_unlimited() {
            CreditsRemaining::Unlimited
        } else {
            CreditsRemaining::Credits(self.remaining_credits())
        }
    }

    /// True when the account is exempt from credit checks.
    pub fn is_unlimited(&self) -> bool {
        self.credit_limit >= UNLIMITED_CREDIT_THRESHOLD
    }

    /// Consumption recorded under one category.
    pub fn used_in(&self, category: CreditCategory) -> u32 {
        match category {
            CreditCategory::PriceChecks => self.price_checks_used,
            CreditCategory::Optimisations => self.optimisations_used,
            CreditCategory::PhotoStudio => self.photo_studio_used,
        }
    }

    /// Records consumption under one category.
    pub fn record(&mut self, category: CreditCategory, amount: u32) {
        match category {
            CreditCategory::PriceChecks => self.price_checks_used += amount,
            CreditCategory::Optimisations => self.optimisations_used += amount,
            CreditCategory::PhotoStudio => self.photo_studio_used += amount,
        }
    }
}
