//! The entitlement evaluator.
//!
//! A pure decision function: given a feature, the account, and a ledger
//! snapshot, decide allow/deny and why. No side effects, safe to call
//! speculatively (the dashboard calls it just to grey out buttons).

use serde::Serialize;

use super::{
    feature_config, Account, CreditsRemaining, FeatureKey, Metering, PlanTier, UsageLedger,
};

/// Why a feature was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum DenialReason {
    /// The account's tier does not unlock the feature.
    TierTooLow {
        required: PlanTier,
        current: PlanTier,
    },
    /// The pooled credit allotment for the period is used up.
    CreditsExhausted,
}

impl DenialReason {
    /// User-facing message for upgrade prompts.
    pub fn message(&self) -> String {
        match self {
            DenialReason::TierTooLow { required, current } => format!(
                "This feature requires the {} plan (you are on {})",
                required, current
            ),
            DenialReason::CreditsExhausted => {
                "You have used all your credits for this period".to_string()
            }
        }
    }
}

/// Result of evaluating one feature for one account.
///
/// Derived per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitlementDecision {
    pub feature: FeatureKey,
    pub allowed: bool,
    pub reason: Option<DenialReason>,
    pub credits_remaining: CreditsRemaining,
    /// Sell-wizard grace pass: informational only. True when the account is
    /// on the free tier and has not yet used its one first-listing pass.
    /// The caller decides whether to bypass metering for that first use.
    pub free_pass_active: bool,
}

/// Decides whether `account` may use `feature` right now.
///
/// Tier check first, then the pooled credit check for metered features.
/// When both fail, the tier reason wins.
pub fn evaluate(feature: FeatureKey, account: &Account, ledger: &UsageLedger) -> EntitlementDecision {
    let config = feature_config(feature);

    let tier_allowed = account.tier.rank() >= config.min_tier.rank();

    let credits_exhausted = match config.metering {
        Metering::None => false,
        Metering::Credits(_) => !ledger.is_unlimited() && ledger.remaining_credits() == 0,
    };

    let reason = if !tier_allowed {
        Some(DenialReason::TierTooLow {
            required: config.min_tier,
            current: account.tier,
        })
    } else if credits_exhausted {
        Some(DenialReason::CreditsExhausted)
    } else {
        None
    };

    let free_pass_active = feature == FeatureKey::SellWizard
        && account.tier == PlanTier::Free
        && !account.first_item_pass_used;

    EntitlementDecision {
        feature,
        allowed: tier_allowed && !credits_exhausted,
        reason,
        credits_remaining: ledger.remaining(),
        free_pass_active,
    }
}
