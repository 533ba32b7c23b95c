//! HTTP handlers for entitlement and webhook endpoints.
//!
//! These handlers connect axum routes to application layer command/query
//! handlers.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::billing::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
};
use crate::application::handlers::entitlement::{
    CheckEntitlementHandler, CheckEntitlementQuery, GetUsageHandler, GetUsageQuery,
    RedeemWizardPassCommand, RedeemWizardPassHandler,
};
use crate::domain::billing::PaymentWebhookVerifier;
use crate::domain::entitlement::{EntitlementError, FeatureKey, TierCatalog};
use crate::domain::foundation::AccountId;
use crate::ports::{AccountStore, CreditGrantStore, LedgerStore, WebhookEventRepository};

use super::dto::{EntitlementResponse, ErrorResponse, RedeemPassResponse, UsageResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned per request; dependencies are Arc-wrapped for cheap sharing.
#[derive(Clone)]
pub struct EntitlementAppState {
    pub accounts: Arc<dyn AccountStore>,
    pub ledgers: Arc<dyn LedgerStore>,
    pub grants: Arc<dyn CreditGrantStore>,
    pub webhook_events: Arc<dyn WebhookEventRepository>,
    pub verifier: Arc<PaymentWebhookVerifier>,
}

impl EntitlementAppState {
    /// Create handlers on demand from the shared state.
    pub fn check_entitlement_handler(&self) -> CheckEntitlementHandler {
        CheckEntitlementHandler::new(self.accounts.clone(), self.ledgers.clone())
    }

    pub fn get_usage_handler(&self) -> GetUsageHandler {
        GetUsageHandler::new(self.ledgers.clone())
    }

    pub fn redeem_wizard_pass_handler(&self) -> RedeemWizardPassHandler {
        RedeemWizardPassHandler::new(self.accounts.clone(), self.ledgers.clone())
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.verifier.clone(),
            self.webhook_events.clone(),
            self.accounts.clone(),
            self.ledgers.clone(),
            self.grants.clone(),
            TierCatalog::shared(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Account Context (would come from auth middleware in production)
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated account context extracted from the request.
///
/// In production this would come from the session middleware; for
/// development and tests an X-Account-Id header is accepted.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub account_id: AccountId,
}

/// Rejection type for AuthenticatedAccount extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedAccount
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let account_id = parts
                .headers
                .get("X-Account-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<AccountId>().ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedAccount { account_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/entitlements/:feature - Evaluate one feature for the account
pub async fn check_entitlement(
    State(state): State<EntitlementAppState>,
    account: AuthenticatedAccount,
    Path(feature): Path<String>,
) -> Result<impl IntoResponse, EntitlementApiError> {
    let feature = FeatureKey::parse(&feature)
        .ok_or_else(|| EntitlementApiError::UnknownFeature(feature))?;

    let handler = state.check_entitlement_handler();
    let decision = handler
        .handle(CheckEntitlementQuery {
            account_id: account.account_id,
            feature,
        })
        .await?;

    Ok(Json(EntitlementResponse::from(decision)))
}

/// GET /api/usage - Usage ledger snapshot for the account
pub async fn get_usage(
    State(state): State<EntitlementAppState>,
    account: AuthenticatedAccount,
) -> Result<impl IntoResponse, EntitlementApiError> {
    let handler = state.get_usage_handler();
    let view = handler
        .handle(GetUsageQuery {
            account_id: account.account_id,
        })
        .await?;

    Ok(Json(UsageResponse::from(view)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/wizard-pass/redeem - Consume the sell-wizard grace pass
pub async fn redeem_wizard_pass(
    State(state): State<EntitlementAppState>,
    account: AuthenticatedAccount,
) -> Result<impl IntoResponse, EntitlementApiError> {
    let handler = state.redeem_wizard_pass_handler();
    let redeemed = handler
        .handle(RedeemWizardPassCommand {
            account_id: account.account_id,
        })
        .await?;

    Ok(Json(RedeemPassResponse { redeemed }))
}

/// POST /api/webhooks/payments - Handle payment provider webhook events
pub async fn handle_payment_webhook(
    State(state): State<EntitlementAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> axum::response::Response {
    let Some(signature) = headers
        .get("Payment-Signature")
        .and_then(|v| v.to_str().ok())
    else {
        let error = ErrorResponse::new("MISSING_SIGNATURE", "Missing Payment-Signature header");
        return (StatusCode::BAD_REQUEST, Json(error)).into_response();
    };

    let handler = state.webhook_handler();
    let command = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    match handler.handle(command).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(err) => {
            // The status code drives the provider's retry behavior.
            let status = err.status_code();
            let body = ErrorResponse::new("WEBHOOK_ERROR", err.to_string());
            (status, Json(body)).into_response()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
pub enum EntitlementApiError {
    UnknownFeature(String),
    Domain(EntitlementError),
}

impl From<EntitlementError> for EntitlementApiError {
    fn from(err: EntitlementError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for EntitlementApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match self {
            EntitlementApiError::UnknownFeature(name) => (
                StatusCode::NOT_FOUND,
                "UNKNOWN_FEATURE",
                format!("No such feature: {}", name),
            ),
            EntitlementApiError::Domain(err) => {
                let (status, code) = match &err {
                    EntitlementError::AccountNotFound(_) => {
                        (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND")
                    }
                    EntitlementError::LedgerNotFound(_) => {
                        (StatusCode::NOT_FOUND, "LEDGER_NOT_FOUND")
                    }
                    EntitlementError::Storage(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                    }
                };
                (status, code, err.to_string())
            }
        };

        let body = ErrorResponse::new(code, message);
        (status, Json(body)).into_response()
    }
}
