//! Plan change reconciliation.
//!
//! Applies payment events to account tier and ledger state. Subscription
//! events are deterministic overwrites (safe to replay); credit packs are
//! additive and guarded by a one-shot transaction claim.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::domain::entitlement::{PlanTier, ProductMapping, TierCatalog};
use crate::ports::{AccountStore, CreditGrantStore, GrantClaim, LedgerStore};

use super::event::{PaymentEvent, PaymentEventType};
use super::processor::PaymentEventHandler;
use super::webhook_errors::WebhookError;

/// Keeps account tier and ledger credit_limit consistent with the payment
/// provider's view of truth.
pub struct PlanReconciler {
    accounts: Arc<dyn AccountStore>,
    ledgers: Arc<dyn LedgerStore>,
    grants: Arc<dyn CreditGrantStore>,
    catalog: &'static TierCatalog,
}

impl PlanReconciler {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        ledgers: Arc<dyn LedgerStore>,
        grants: Arc<dyn CreditGrantStore>,
        catalog: &'static TierCatalog,
    ) -> Self {
        Self {
            accounts,
            ledgers,
            grants,
            catalog,
        }
    }

    /// Applies one payment event.
    pub async fn apply(&self, event: &PaymentEvent) -> Result<(), WebhookError> {
        let account = self
            .accounts
            .find_by_external_ref(&event.account_ref)
            .await?
            .ok_or_else(|| {
                error!(
                    account_ref = %event.account_ref,
                    event_id = %event.id,
                    "payment event references unknown account"
                );
                WebhookError::AccountNotFound(event.account_ref.clone())
            })?;

        match event.parsed_type() {
            PaymentEventType::SubscriptionActivated | PaymentEventType::SubscriptionUpdated => {
                self.apply_subscription(event, &account.id).await
            }
            PaymentEventType::SubscriptionCancelled => {
                self.apply_cancellation(event, &account.id).await
            }
            PaymentEventType::CreditPackPurchased => {
                self.apply_credit_pack(event, &account.id).await
            }
            PaymentEventType::Unknown => Err(WebhookError::Ignored(format!(
                "no handler for event type: {}",
                event.event_type
            ))),
        }
    }

    /// Subscription activated or updated: overwrite tier and credit limit.
    ///
    /// Full overwrite, not additive. A downgrade reduces the limit even when
    /// credits were already consumed this period; the evaluator's max(0, ..)
    /// rule turns any overshoot into "exhausted", not an error.
    async fn apply_subscription(
        &self,
        event: &PaymentEvent,
        account_id: &crate::domain::foundation::AccountId,
    ) -> Result<(), WebhookError> {
        let product_id = event
            .product_id
            .as_deref()
            .ok_or(WebhookError::MissingField("product_id"))?;

        let (tier, credits) = match self.catalog.resolve_product(product_id) {
            Some(ProductMapping::Subscription(tier)) => {
                (tier, self.catalog.monthly_credits(tier))
            }
            Some(ProductMapping::CreditPack(_)) | None => {
                // Deployment/config mismatch. Fall back to the catalog's one
                // safe default instead of failing the whole event.
                let fallback = self.catalog.fallback();
                error!(
                    product_id,
                    event_id = %event.id,
                    fallback_tier = %fallback.tier,
                    "subscription product not in catalog, applying fallback tier"
                );
                (fallback.tier, fallback.monthly_credits)
            }
        };

        self.accounts.set_tier(account_id, tier).await?;
        self.ledgers.set_credit_limit(account_id, credits).await?;

        info!(
            account_id = %account_id,
            tier = %tier,
            credit_limit = credits,
            event_id = %event.id,
            "subscription reconciled"
        );
        Ok(())
    }

    /// Subscription cancelled or expired: back to the free tier.
    async fn apply_cancellation(
        &self,
        event: &PaymentEvent,
        account_id: &crate::domain::foundation::AccountId,
    ) -> Result<(), WebhookError> {
        let free_credits = self.catalog.monthly_credits(PlanTier::Free);

        self.accounts.set_tier(account_id, PlanTier::Free).await?;
        self.ledgers
            .set_credit_limit(account_id, free_credits)
            .await?;

        info!(
            account_id = %account_id,
            event_id = %event.id,
            "subscription cancelled, account reset to free tier"
        );
        Ok(())
    }

    /// Credit pack purchased: additive, deduped on the transaction id.
    ///
    /// The claim is recorded before the grant is applied so a replayed
    /// purchase event cannot double-grant.
    async fn apply_credit_pack(
        &self,
        event: &PaymentEvent,
        account_id: &crate::domain::foundation::AccountId,
    ) -> Result<(), WebhookError> {
        let product_id = event
            .product_id
            .as_deref()
            .ok_or(WebhookError::MissingField("product_id"))?;

        let credits = match self.catalog.resolve_product(product_id) {
            Some(ProductMapping::CreditPack(credits)) => credits,
            Some(ProductMapping::Subscription(_)) | None => {
                error!(
                    product_id,
                    event_id = %event.id,
                    "credit pack product not in catalog"
                );
                return Err(WebhookError::UnknownProduct(product_id.to_string()));
            }
        };

        match self.grants.claim(&event.transaction_id).await? {
            GrantClaim::Claimed => {
                if let Err(err) = self
                    .ledgers
                    .add_to_credit_limit(account_id, credits)
                    .await
                {
                    // The claim is already recorded; a redelivery would be
                    // skipped, so this grant needs manual reconciliation.
                    warn!(
                        account_id = %account_id,
                        transaction_id = %event.transaction_id,
                        credits,
                        error = %err,
                        "credit pack claimed but grant failed"
                    );
                    return Err(err.into());
                }
                info!(
                    account_id = %account_id,
                    credits,
                    transaction_id = %event.transaction_id,
                    "credit pack granted"
                );
                Ok(())
            }
            GrantClaim::AlreadyGranted => {
                debug!(
                    transaction_id = %event.transaction_id,
                    "credit pack transaction already granted, skipping"
                );
                Ok(())
            }
        }
    }
}

#[async_trait]
impl PaymentEventHandler for PlanReconciler {
    async fn handle(&self, event: &PaymentEvent) -> Result<(), WebhookError> {
        self.apply(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryAccountStore, InMemoryCreditGrantStore, InMemoryLedgerStore,
    };
    use crate::domain::billing::PaymentEventBuilder;
    use crate::domain::entitlement::Account;

    struct Fixture {
        accounts: Arc<InMemoryAccountStore>,
        ledgers: Arc<InMemoryLedgerStore>,
        reconciler: PlanReconciler,
        account: Account,
    }

    async fn fixture() -> Fixture {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let ledgers = Arc::new(InMemoryLedgerStore::new());
        let grants = Arc::new(InMemoryCreditGrantStore::new());

        let account = Account::signup("seller@example.com", "Europe/Vilnius");
        accounts.upsert(&account).await.unwrap();
        ledgers.create(&account.id, 5).await.unwrap();

        let reconciler = PlanReconciler::new(
            accounts.clone(),
            ledgers.clone(),
            grants,
            TierCatalog::shared(),
        );

        Fixture {
            accounts,
            ledgers,
            reconciler,
            account,
        }
    }

    fn activation(product: &str) -> PaymentEvent {
        PaymentEventBuilder::new()
            .event_type("subscription.activated")
            .product_id(product)
            .build()
    }

    // ══════════════════════════════════════════════════════════════
    // Subscription Events
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn activation_sets_tier_and_overwrites_limit() {
        let f = fixture().await;

        f.reconciler
            .apply(&activation("prod_business_monthly"))
            .await
            .unwrap();

        let account = f.accounts.get(&f.account.id).await.unwrap().unwrap();
        let ledger = f.ledgers.get(&f.account.id).await.unwrap().unwrap();
        assert_eq!(account.tier, PlanTier::Business);
        assert_eq!(ledger.credit_limit, 600);
    }

    #[tokio::test]
    async fn unknown_subscription_product_falls_back() {
        let f = fixture().await;

        f.reconciler
            .apply(&activation("prod_legacy_grandfathered"))
            .await
            .unwrap();

        let account = f.accounts.get(&f.account.id).await.unwrap().unwrap();
        let ledger = f.ledgers.get(&f.account.id).await.unwrap().unwrap();
        assert_eq!(account.tier, PlanTier::Pro);
        assert_eq!(ledger.credit_limit, 50);
    }

    #[tokio::test]
    async fn activation_is_idempotent() {
        let f = fixture().await;
        let event = activation("prod_starter_monthly");

        f.reconciler.apply(&event).await.unwrap();
        f.reconciler.apply(&event).await.unwrap();

        let account = f.accounts.get(&f.account.id).await.unwrap().unwrap();
        let ledger = f.ledgers.get(&f.account.id).await.unwrap().unwrap();
        assert_eq!(account.tier, PlanTier::Starter);
        assert_eq!(ledger.credit_limit, 50);
    }

    #[tokio::test]
    async fn activation_without_product_is_rejected() {
        let f = fixture().await;
        let event = PaymentEventBuilder::new()
            .event_type("subscription.activated")
            .no_product()
            .build();

        let result = f.reconciler.apply(&event).await;

        assert!(matches!(result, Err(WebhookError::MissingField("product_id"))));
    }

    #[tokio::test]
    async fn cancellation_resets_to_free_defaults() {
        let f = fixture().await;
        f.reconciler
            .apply(&activation("prod_business_monthly"))
            .await
            .unwrap();

        let event = PaymentEventBuilder::new()
            .event_type("subscription.cancelled")
            .no_product()
            .build();
        f.reconciler.apply(&event).await.unwrap();

        let account = f.accounts.get(&f.account.id).await.unwrap().unwrap();
        let ledger = f.ledgers.get(&f.account.id).await.unwrap().unwrap();
        assert_eq!(account.tier, PlanTier::Free);
        assert_eq!(ledger.credit_limit, 5);
    }

    // ══════════════════════════════════════════════════════════════
    // Credit Pack Events
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn credit_pack_adds_to_limit() {
        let f = fixture().await;
        let event = PaymentEventBuilder::new()
            .event_type("credit_pack.purchased")
            .product_id("prod_credit_pack_25")
            .build();

        f.reconciler.apply(&event).await.unwrap();

        let ledger = f.ledgers.get(&f.account.id).await.unwrap().unwrap();
        assert_eq!(ledger.credit_limit, 30); // 5 + 25
    }

    #[tokio::test]
    async fn replayed_credit_pack_grants_once() {
        let f = fixture().await;
        let event = PaymentEventBuilder::new()
            .event_type("credit_pack.purchased")
            .product_id("prod_credit_pack_100")
            .transaction_id("txn_pack_1")
            .build();

        f.reconciler.apply(&event).await.unwrap();
        f.reconciler.apply(&event).await.unwrap();

        let ledger = f.ledgers.get(&f.account.id).await.unwrap().unwrap();
        assert_eq!(ledger.credit_limit, 105); // granted exactly once
    }

    #[tokio::test]
    async fn credit_pack_does_not_touch_tier_or_counters() {
        let f = fixture().await;
        f.ledgers
            .debit_within_limit(
                &f.account.id,
                crate::domain::entitlement::CreditCategory::PriceChecks,
                2,
            )
            .await
            .unwrap();

        let event = PaymentEventBuilder::new()
            .event_type("credit_pack.purchased")
            .product_id("prod_credit_pack_25")
            .build();
        f.reconciler.apply(&event).await.unwrap();

        let account = f.accounts.get(&f.account.id).await.unwrap().unwrap();
        let ledger = f.ledgers.get(&f.account.id).await.unwrap().unwrap();
        assert_eq!(account.tier, PlanTier::Free);
        assert_eq!(ledger.price_checks_used, 2);
    }

    #[tokio::test]
    async fn unknown_credit_pack_product_is_an_error() {
        let f = fixture().await;
        let event = PaymentEventBuilder::new()
            .event_type("credit_pack.purchased")
            .product_id("prod_mystery_pack")
            .build();

        let result = f.reconciler.apply(&event).await;

        assert!(matches!(result, Err(WebhookError::UnknownProduct(_))));
    }

    // ══════════════════════════════════════════════════════════════
    // Account Resolution
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unmatched_account_ref_is_an_error() {
        let f = fixture().await;
        let event = PaymentEventBuilder::new()
            .account_ref("stranger@example.com")
            .build();

        let result = f.reconciler.apply(&event).await;

        assert!(matches!(result, Err(WebhookError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn unknown_event_type_is_ignored() {
        let f = fixture().await;
        let event = PaymentEventBuilder::new()
            .event_type("invoice.finalized")
            .build();

        let result = f.reconciler.apply(&event).await;

        assert!(matches!(result, Err(WebhookError::Ignored(_))));
    }
}
