//! Tier catalog: allotments, prices, and payment-product mapping.
//!
//! The catalog is the single source of truth for what each tier grants and
//! how payment-provider product identifiers resolve to tiers and credit
//! packs. One explicit fallback entry covers unrecognized subscription
//! products; call sites must not carry their own defaults.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::PlanTier;

/// Static configuration for a single tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierDefinition {
    /// The tier this definition applies to.
    pub tier: PlanTier,
    /// Credits granted each billing period.
    pub monthly_credits: u32,
    /// Monthly price in cents.
    pub price_cents: u32,
}

/// What a payment-provider product identifier resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductMapping {
    /// A recurring subscription for the given tier.
    Subscription(PlanTier),
    /// A one-time credit pack granting the given number of credits.
    CreditPack(u32),
}

/// Immutable catalog of tiers, products, and credit packs.
///
/// Built once at startup and shared read-only; see [`TierCatalog::shared`].
#[derive(Debug, Clone)]
pub struct TierCatalog {
    definitions: HashMap<PlanTier, TierDefinition>,
    products: HashMap<String, ProductMapping>,
    fallback: TierDefinition,
}

impl TierCatalog {
    /// Builds the standard Flipkit catalog.
    ///
    /// # Tier Configuration
    ///
    /// | Tier | Monthly credits | Price |
    /// |------|-----------------|-------|
    /// | Free | 5 | $0 |
    /// | Starter | 50 | $9.99 |
    /// | Pro | 150 | $19.99 |
    /// | Business | 600 | $39.99 |
    pub fn standard() -> Self {
        let definitions = [
            TierDefinition {
                tier: PlanTier::Free,
                monthly_credits: 5,
                price_cents: 0,
            },
            TierDefinition {
                tier: PlanTier::Starter,
                monthly_credits: 50,
                price_cents: 999,
            },
            TierDefinition {
                tier: PlanTier::Pro,
                monthly_credits: 150,
                price_cents: 1999,
            },
            TierDefinition {
                tier: PlanTier::Business,
                monthly_credits: 600,
                price_cents: 3999,
            },
        ]
        .into_iter()
        .map(|d| (d.tier, d))
        .collect();

        let products = [
            ("prod_starter_monthly", ProductMapping::Subscription(PlanTier::Starter)),
            ("prod_pro_monthly", ProductMapping::Subscription(PlanTier::Pro)),
            ("prod_business_monthly", ProductMapping::Subscription(PlanTier::Business)),
            ("prod_credit_pack_25", ProductMapping::CreditPack(25)),
            ("prod_credit_pack_100", ProductMapping::CreditPack(100)),
        ]
        .into_iter()
        .map(|(id, m)| (id.to_string(), m))
        .collect();

        Self {
            definitions,
            products,
            // Unrecognized subscription products land here instead of
            // failing the whole payment event.
            fallback: TierDefinition {
                tier: PlanTier::Pro,
                monthly_credits: 50,
                price_cents: 1999,
            },
        }
    }

    /// Returns the process-wide shared catalog.
    pub fn shared() -> &'static TierCatalog {
        static CATALOG: Lazy<TierCatalog> = Lazy::new(TierCatalog::standard);
        &CATALOG
    }

    /// Returns the definition for a tier.
    pub fn definition(&self, tier: PlanTier) -> &TierDefinition {
        // Every tier is inserted in standard(); the map is total.
        &self.definitions[&tier]
    }

    /// Returns the monthly credit allotment for a tier.
    pub fn monthly_credits(&self, tier: PlanTier) -> u32 {
        self.definition(tier).monthly_credits
    }

    /// Resolves a payment-provider product identifier.
    ///
    /// Returns `None` for unknown products; subscription call sites should
    /// then use [`TierCatalog::fallback`], credit-pack call sites must treat
    /// it as a configuration error.
    pub fn resolve_product(&self, product_id: &str) -> Option<ProductMapping> {
        self.products.get(product_id).copied()
    }

    /// The safe-default definition applied when a subscription product is
    /// not recognized.
    pub fn fallback(&self) -> &TierDefinition {
        &self.fallback
    }
}

impl Default for TierCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
