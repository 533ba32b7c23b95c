//! Payment webhook event types.
//!
//! Defines the structures for parsing payment-provider webhook payloads.
//! Only fields relevant to plan reconciliation are captured.

use serde::{Deserialize, Serialize};

/// Payment webhook event.
///
/// The provider reports plan and credit changes out-of-band from user
/// action; this is the shape reconciliation consumes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "subscription.activated").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// External account reference - the billing email.
    pub account_ref: String,

    /// Purchased product identifier. Absent on cancellations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    /// Provider transaction id, the dedup key for credit-pack grants.
    pub transaction_id: String,
}

impl PaymentEvent {
    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> PaymentEventType {
        PaymentEventType::from_str(&self.event_type)
    }
}

/// Known payment event types that we handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEventType {
    /// New subscription activated.
    SubscriptionActivated,
    /// Subscription renewed or plan changed.
    SubscriptionUpdated,
    /// Subscription cancelled or expired.
    SubscriptionCancelled,
    /// One-time credit pack purchased.
    CreditPackPurchased,
    /// Unknown or unhandled event type.
    Unknown,
}

impl PaymentEventType {
    /// Parse event type from string.
    pub fn from_str(s: &str) -> Self {
        match s {
            "subscription.activated" => Self::SubscriptionActivated,
            "subscription.updated" => Self::SubscriptionUpdated,
            "subscription.cancelled" => Self::SubscriptionCancelled,
            "credit_pack.purchased" => Self::CreditPackPurchased,
            _ => Self::Unknown,
        }
    }

    /// Convert to the provider's event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubscriptionActivated => "subscription.activated",
            Self::SubscriptionUpdated => "subscription.updated",
            Self::SubscriptionCancelled => "subscription.cancelled",
            Self::CreditPackPurchased => "credit_pack.purchased",
            Self::Unknown => "unknown",
        }
    }
}

/// Builder for creating test PaymentEvent instances.
#[cfg(test)]
pub struct PaymentEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    account_ref: String,
    product_id: Option<String>,
    transaction_id: String,
}

#[cfg(test)]
impl Default for PaymentEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "subscription.activated".to_string(),
            created: chrono::Utc::now().timestamp(),
            account_ref: "seller@example.com".to_string(),
            product_id: Some("prod_pro_monthly".to_string()),
            transaction_id: "txn_test_123".to_string(),
        }
    }
}

#[cfg(test)]
impl PaymentEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn account_ref(mut self, account_ref: impl Into<String>) -> Self {
        self.account_ref = account_ref.into();
        self
    }

    pub fn product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    pub fn no_product(mut self) -> Self {
        self.product_id = None;
        self
    }

    pub fn transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = transaction_id.into();
        self
    }

    pub fn build(self) -> PaymentEvent {
        PaymentEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            account_ref: self.account_ref,
            product_id: self.product_id,
            transaction_id: self.transaction_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_activation_event() {
        let json = r#"{
            "id": "evt_1234567890",
            "type": "subscription.activated",
            "created": 1704067200,
            "account_ref": "seller@example.com",
            "product_id": "prod_starter_monthly",
            "transaction_id": "txn_abc"
        }"#;

        let event: PaymentEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.id, "evt_1234567890");
        assert_eq!(event.parsed_type(), PaymentEventType::SubscriptionActivated);
        assert_eq!(event.account_ref, "seller@example.com");
        assert_eq!(event.product_id.as_deref(), Some("prod_starter_monthly"));
        assert_eq!(event.transaction_id, "txn_abc");
    }

    #[test]
    fn deserialize_cancellation_without_product() {
        let json = r#"{
            "id": "evt_cancel",
            "type": "subscription.cancelled",
            "created": 1704067200,
            "account_ref": "seller@example.com",
            "transaction_id": "txn_cancel"
        }"#;

        let event: PaymentEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.parsed_type(), PaymentEventType::SubscriptionCancelled);
        assert!(event.product_id.is_none());
    }

    #[test]
    fn serialize_event_roundtrip() {
        let event = PaymentEventBuilder::new()
            .id("evt_roundtrip")
            .event_type("credit_pack.purchased")
            .product_id("prod_credit_pack_25")
            .build();

        let json = serde_json::to_string(&event).unwrap();
        let parsed: PaymentEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.id, "evt_roundtrip");
        assert_eq!(parsed.parsed_type(), PaymentEventType::CreditPackPurchased);
    }

    #[test]
    fn event_type_from_str_unknown() {
        assert_eq!(
            PaymentEventType::from_str("invoice.finalized"),
            PaymentEventType::Unknown
        );
    }

    #[test]
    fn event_type_as_str_roundtrip() {
        let types = [
            PaymentEventType::SubscriptionActivated,
            PaymentEventType::SubscriptionUpdated,
            PaymentEventType::SubscriptionCancelled,
            PaymentEventType::CreditPackPurchased,
        ];

        for event_type in types {
            assert_eq!(PaymentEventType::from_str(event_type.as_str()), event_type);
        }
    }
}
