//! Axum router configuration for entitlement endpoints.
//!
//! This module defines the route structure for entitlement-related API
//! endpoints and wires them to their corresponding handlers.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    check_entitlement, get_usage, handle_payment_webhook, redeem_wizard_pass,
    EntitlementAppState,
};

/// Create the entitlement API router.
///
/// # Routes
///
/// ## Account Endpoints (require authentication)
/// - `GET /entitlements/:feature` - Evaluate one feature for the account
/// - `GET /usage` - Usage ledger snapshot
/// - `POST /wizard-pass/redeem` - Consume the sell-wizard grace pass
pub fn entitlement_routes() -> Router<EntitlementAppState> {
    Router::new()
        .route("/entitlements/:feature", get(check_entitlement))
        .route("/usage", get(get_usage))
        .route("/wizard-pass/redeem", post(redeem_wizard_pass))
}

/// Create the payment webhook router.
///
/// Separate from the account routes because webhooks don't carry user
/// authentication (they're verified via signature).
///
/// # Routes
/// - `POST /payments` - Handle payment provider webhooks
pub fn webhook_routes() -> Router<EntitlementAppState> {
    Router::new().route("/payments", post(handle_payment_webhook))
}

/// Create the complete entitlement module router.
///
/// Suitable for mounting at `/api`.
pub fn entitlement_router() -> Router<EntitlementAppState> {
    Router::new()
        .merge(entitlement_routes())
        .nest("/webhooks", webhook_routes())
}
