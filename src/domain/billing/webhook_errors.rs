//! Webhook error types for payment webhook handling.
//!
//! Defines all error conditions that can occur during webhook processing,
//! with HTTP status code mapping and retryability semantics.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is outside the acceptable window (5 minutes).
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse webhook payload or signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from webhook payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The account_ref could not be matched to an account.
    #[error("No account for reference: {0}")]
    AccountNotFound(String),

    /// A credit-pack product id with no catalog entry. Deployment/config
    /// mismatch; there is no safe fallback for a paid grant.
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// Event was intentionally ignored (not an error condition).
    #[error("Event ignored: {0}")]
    Ignored(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if the provider should retry delivering this webhook.
    ///
    /// Retryable errors indicate temporary failures that may succeed on
    /// subsequent attempts (database issues, eventual consistency between
    /// signup and the first payment event).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Database(_) | WebhookError::AccountNotFound(_)
        )
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// Status codes determine the provider's retry behavior:
    /// - 2xx: Event acknowledged, no retry
    /// - 4xx: Client error, no retry
    /// - 5xx: Server error, will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Auth failures - don't retry
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange => {
                StatusCode::UNAUTHORIZED
            }

            // Invalid timestamp (future) - don't retry
            WebhookError::InvalidTimestamp => StatusCode::BAD_REQUEST,

            // Bad request - don't retry
            WebhookError::ParseError(_) | WebhookError::MissingField(_) => {
                StatusCode::BAD_REQUEST
            }

            // Ignored events are acknowledged as success
            WebhookError::Ignored(_) => StatusCode::OK,

            // Server errors - will retry
            WebhookError::AccountNotFound(_)
            | WebhookError::UnknownProduct(_)
            | WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Converts DomainError to WebhookError for repository operations.
impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Retryability Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn database_error_is_retryable() {
        let err = WebhookError::Database("connection failed".to_string());
        assert!(err.is_retryable());
    }

    #[test]
    fn account_not_found_is_retryable() {
        // Eventual consistency - signup may land after the first event
        let err = WebhookError::AccountNotFound("seller@example.com".to_string());
        assert!(err.is_retryable());
    }

    #[test]
    fn invalid_signature_is_not_retryable() {
        assert!(!WebhookError::InvalidSignature.is_retryable());
    }

    #[test]
    fn parse_error_is_not_retryable() {
        assert!(!WebhookError::ParseError("bad json".to_string()).is_retryable());
    }

    #[test]
    fn unknown_product_is_not_retryable() {
        // Redelivery cannot fix a config mismatch, but the 500 keeps the
        // event visible in the provider dashboard until the mapping ships.
        let err = WebhookError::UnknownProduct("prod_mystery".to_string());
        assert!(!err.is_retryable());
    }

    #[test]
    fn ignored_is_not_retryable() {
        assert!(!WebhookError::Ignored("not relevant".to_string()).is_retryable());
    }

    // ══════════════════════════════════════════════════════════════
    // Status Code Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invalid_signature_returns_unauthorized() {
        assert_eq!(
            WebhookError::InvalidSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn timestamp_out_of_range_returns_unauthorized() {
        assert_eq!(
            WebhookError::TimestampOutOfRange.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn invalid_timestamp_returns_bad_request() {
        assert_eq!(
            WebhookError::InvalidTimestamp.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn parse_error_returns_bad_request() {
        assert_eq!(
            WebhookError::ParseError("syntax error".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn missing_field_returns_bad_request() {
        assert_eq!(
            WebhookError::MissingField("product_id").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn ignored_returns_ok() {
        // Ignored events should be acknowledged to prevent retries
        assert_eq!(
            WebhookError::Ignored("not relevant".to_string()).status_code(),
            StatusCode::OK
        );
    }

    #[test]
    fn account_not_found_returns_internal_error() {
        assert_eq!(
            WebhookError::AccountNotFound("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn database_error_returns_internal_error() {
        assert_eq!(
            WebhookError::Database("connection lost".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
