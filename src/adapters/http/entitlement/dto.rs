//! Request and response DTOs for the entitlement endpoints.

use serde::Serialize;

use crate::application::handlers::entitlement::UsageView;
use crate::domain::entitlement::{CreditsRemaining, EntitlementDecision};

/// Response body for `GET /api/entitlements/:feature`.
#[derive(Debug, Clone, Serialize)]
pub struct EntitlementResponse {
    pub feature: String,
    pub allowed: bool,
    /// Upgrade-prompt text; present only when denied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub credits_remaining: CreditsRemaining,
    pub free_pass_active: bool,
}

impl From<EntitlementDecision> for EntitlementResponse {
    fn from(decision: EntitlementDecision) -> Self {
        Self {
            feature: decision.feature.to_string(),
            allowed: decision.allowed,
            reason: decision.reason.map(|r| r.message()),
            credits_remaining: decision.credits_remaining,
            free_pass_active: decision.free_pass_active,
        }
    }
}

/// Response body for `GET /api/usage`.
#[derive(Debug, Clone, Serialize)]
pub struct UsageResponse {
    pub price_checks_used: u32,
    pub optimisations_used: u32,
    pub photo_studio_used: u32,
    pub total_consumed: u32,
    pub credit_limit: u32,
    pub remaining: CreditsRemaining,
}

impl From<UsageView> for UsageResponse {
    fn from(view: UsageView) -> Self {
        Self {
            price_checks_used: view.price_checks_used,
            optimisations_used: view.optimisations_used,
            photo_studio_used: view.photo_studio_used,
            total_consumed: view.total_consumed,
            credit_limit: view.credit_limit,
            remaining: view.remaining,
        }
    }
}

/// Response body for `POST /api/wizard-pass/redeem`.
#[derive(Debug, Clone, Serialize)]
pub struct RedeemPassResponse {
    pub redeemed: bool,
}

/// Standard error envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
