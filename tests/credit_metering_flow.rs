//! Integration tests for the credit debit protocol.
//!
//! These tests exercise the full metered-operation path over the in-memory
//! adapters: entitlement evaluation, the paid-work boundary, and the atomic
//! conditional debit.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use flipkit::adapters::memory::{InMemoryAccountStore, InMemoryLedgerStore};
use flipkit::application::handlers::entitlement::{
    CheckEntitlementHandler, CheckEntitlementQuery, MeteredError, MeteredRequest,
    RunMeteredOperationHandler,
};
use flipkit::domain::entitlement::{
    Account, CreditsRemaining, DenialReason, FeatureKey, PlanTier, WorkError,
};
use flipkit::domain::foundation::AccountId;
use flipkit::ports::{AccountStore, LedgerStore};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct World {
    accounts: Arc<InMemoryAccountStore>,
    ledgers: Arc<InMemoryLedgerStore>,
    runner: RunMeteredOperationHandler,
    checker: CheckEntitlementHandler,
}

impl World {
    async fn with_account(tier: PlanTier, credit_limit: u32) -> (Self, AccountId) {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let ledgers = Arc::new(InMemoryLedgerStore::new());

        let mut account = Account::signup("seller@example.com", "Europe/Vilnius");
        account.tier = tier;
        accounts.upsert(&account).await.unwrap();
        ledgers.create(&account.id, credit_limit).await.unwrap();

        let runner = RunMeteredOperationHandler::new(accounts.clone(), ledgers.clone());
        let checker = CheckEntitlementHandler::new(accounts.clone(), ledgers.clone());

        (
            Self {
                accounts,
                ledgers,
                runner,
                checker,
            },
            account.id,
        )
    }

    async fn total_consumed(&self, account_id: &AccountId) -> u32 {
        self.ledgers
            .get(account_id)
            .await
            .unwrap()
            .unwrap()
            .total_consumed()
    }
}

// =============================================================================
// Credit Exhaustion Boundary
// =============================================================================

#[tokio::test]
async fn nth_use_passes_and_n_plus_first_is_denied() {
    let (world, account_id) = World::with_account(PlanTier::Pro, 3).await;

    // Uses 1..=N succeed.
    for n in 1..=3u32 {
        let outcome = world
            .runner
            .handle(
                MeteredRequest::new(account_id, FeatureKey::PriceCheck),
                || async { Ok::<_, WorkError>(()) },
            )
            .await
            .unwrap();
        assert_eq!(outcome.remaining, CreditsRemaining::Credits(3 - n));
    }

    // The (N+1)th attempt is denied for every credit-metered feature,
    // before any paid work runs.
    for feature in [
        FeatureKey::PriceCheck,
        FeatureKey::ListingOptimize,
        FeatureKey::BulkOptimize,
    ] {
        let result = world
            .runner
            .handle(MeteredRequest::new(account_id, feature), || async {
                Ok::<_, WorkError>(())
            })
            .await;
        assert!(matches!(result, Err(MeteredError::Denied(_))));
    }

    assert_eq!(world.total_consumed(&account_id).await, 3);
}

#[tokio::test]
async fn exhaustion_is_shared_across_categories() {
    let (world, account_id) = World::with_account(PlanTier::Business, 2).await;

    world
        .runner
        .handle(
            MeteredRequest::new(account_id, FeatureKey::PriceCheck),
            || async { Ok::<_, WorkError>(()) },
        )
        .await
        .unwrap();
    world
        .runner
        .handle(
            MeteredRequest::new(account_id, FeatureKey::BackgroundRemoval),
            || async { Ok::<_, WorkError>(()) },
        )
        .await
        .unwrap();

    // Two categories consumed the shared pool; a third category is denied.
    let result = world
        .runner
        .handle(
            MeteredRequest::new(account_id, FeatureKey::ListingOptimize),
            || async { Ok::<_, WorkError>(()) },
        )
        .await;

    assert!(matches!(
        result,
        Err(MeteredError::Denied(DenialReason::CreditsExhausted))
    ));
}

// =============================================================================
// Unlimited Exemption
// =============================================================================

#[tokio::test]
async fn unlimited_account_is_always_credit_allowed() {
    let (world, account_id) = World::with_account(PlanTier::Business, 999_999).await;

    for _ in 0..50 {
        world
            .runner
            .handle(
                MeteredRequest::new(account_id, FeatureKey::PriceCheck),
                || async { Ok::<_, WorkError>(()) },
            )
            .await
            .unwrap();
    }

    let decision = world
        .checker
        .handle(CheckEntitlementQuery {
            account_id,
            feature: FeatureKey::PriceCheck,
        })
        .await
        .unwrap();

    assert!(decision.allowed);
    assert_eq!(decision.credits_remaining, CreditsRemaining::Unlimited);
    assert_eq!(world.total_consumed(&account_id).await, 50);
}

// =============================================================================
// No Debit On Failure
// =============================================================================

#[tokio::test]
async fn provider_failures_never_debit() {
    let (world, account_id) = World::with_account(PlanTier::Pro, 10).await;

    for err in [
        WorkError::RateLimited,
        WorkError::QuotaExhausted,
        WorkError::Timeout,
        WorkError::Failed("malformed response".to_string()),
    ] {
        let failure = err.clone();
        let result = world
            .runner
            .handle(
                MeteredRequest::new(account_id, FeatureKey::ListingOptimize),
                move || async move { Err::<(), _>(failure) },
            )
            .await;

        match result {
            Err(MeteredError::Work(work_err)) => assert_eq!(work_err, err),
            other => panic!("expected work error, got {:?}", other.map(|_| ())),
        }
    }

    assert_eq!(world.total_consumed(&account_id).await, 0);
}

// =============================================================================
// Multi-Unit Debit
// =============================================================================

#[tokio::test]
async fn translating_into_three_languages_debits_three() {
    let (world, account_id) = World::with_account(PlanTier::Starter, 50).await;

    let outcome = world
        .runner
        .handle(
            MeteredRequest::new(account_id, FeatureKey::TranslateListing).with_units(3),
            || async { Ok::<_, WorkError>(vec!["de", "fr", "lt"]) },
        )
        .await
        .unwrap();

    assert_eq!(outcome.credits_debited, 3);
    assert_eq!(outcome.remaining, CreditsRemaining::Credits(47));
    assert_eq!(world.total_consumed(&account_id).await, 3);
}

// =============================================================================
// Concurrent Debit Safety
// =============================================================================

#[tokio::test]
async fn two_concurrent_debits_on_one_credit_yield_one_success() {
    let (world, account_id) = World::with_account(PlanTier::Pro, 1).await;
    let runner = Arc::new(world.runner);
    let successes = Arc::new(AtomicU32::new(0));

    let mut tasks = Vec::new();
    for _ in 0..2 {
        let runner = runner.clone();
        let successes = successes.clone();
        tasks.push(tokio::spawn(async move {
            let outcome = runner
                .handle(
                    MeteredRequest::new(account_id, FeatureKey::PriceCheck),
                    || async {
                        // Yield so both tasks pass the advisory check before
                        // either reaches the debit.
                        tokio::task::yield_now().await;
                        Ok::<_, WorkError>(())
                    },
                )
                .await;
            if let Ok(outcome) = outcome {
                if outcome.credits_debited == 1 {
                    successes.fetch_add(1, Ordering::SeqCst);
                }
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    // At most one request recorded the spend, and consumption never
    // exceeded the limit.
    assert!(successes.load(Ordering::SeqCst) <= 1);
    let ledger = world.ledgers.get(&account_id).await.unwrap().unwrap();
    assert!(ledger.total_consumed() <= ledger.credit_limit);
}

// =============================================================================
// Speculative Evaluation
// =============================================================================

#[tokio::test]
async fn rendering_disabled_buttons_never_spends() {
    let (world, account_id) = World::with_account(PlanTier::Free, 5).await;

    for _ in 0..25 {
        for feature in FeatureKey::ALL {
            world
                .checker
                .handle(CheckEntitlementQuery {
                    account_id,
                    feature,
                })
                .await
                .unwrap();
        }
    }

    assert_eq!(world.total_consumed(&account_id).await, 0);
    // The account record is untouched as well.
    let account = world.accounts.get(&account_id).await.unwrap().unwrap();
    assert!(!account.first_item_pass_used);
}
