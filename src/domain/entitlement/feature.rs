//! Feature keys and per-feature gating configuration.
//!
//! Each feature names the minimum tier that unlocks it and, when metered,
//! the ledger category it debits. Several features may share one category:
//! the photo-studio operations all bill against the same counter.

use serde::{Deserialize, Serialize};

use super::{CreditCategory, PlanTier};

/// Identifier for a gated product feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKey {
    /// Reference-price lookup for a single listing.
    PriceCheck,
    /// AI rewrite of one listing's title and description.
    ListingOptimize,
    /// Translation of a listing into target languages.
    TranslateListing,
    /// Batch optimisation across many listings.
    BulkOptimize,
    /// Photo-studio background removal.
    BackgroundRemoval,
    /// Photo-studio lighting and sharpness enhancement.
    PhotoEnhance,
    /// Niche and trend discovery reports.
    TrendDiscovery,
    /// Publishing a listing to other marketplaces.
    CrossPublish,
    /// Guided first-listing wizard.
    SellWizard,
}

impl FeatureKey {
    /// All feature keys.
    pub const ALL: [FeatureKey; 9] = [
        FeatureKey::PriceCheck,
        FeatureKey::ListingOptimize,
        FeatureKey::TranslateListing,
        FeatureKey::BulkOptimize,
        FeatureKey::BackgroundRemoval,
        FeatureKey::PhotoEnhance,
        FeatureKey::TrendDiscovery,
        FeatureKey::CrossPublish,
        FeatureKey::SellWizard,
    ];

    /// Returns the snake_case wire name for this key.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKey::PriceCheck => "price_check",
            FeatureKey::ListingOptimize => "listing_optimize",
            FeatureKey::TranslateListing => "translate_listing",
            FeatureKey::BulkOptimize => "bulk_optimize",
            FeatureKey::BackgroundRemoval => "background_removal",
            FeatureKey::PhotoEnhance => "photo_enhance",
            FeatureKey::TrendDiscovery => "trend_discovery",
            FeatureKey::CrossPublish => "cross_publish",
            FeatureKey::SellWizard => "sell_wizard",
        }
    }

    /// Parses a wire name into a feature key.
    ///
    /// Returns `None` for unknown names so HTTP callers can reject them;
    /// inside the crate the enum itself makes unknown keys unrepresentable.
    pub fn parse(s: &str) -> Option<Self> {
        FeatureKey::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether and how a feature consumes credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metering {
    /// The feature is free to use once the tier check passes.
    None,
    /// Each use debits the given ledger category.
    Credits(CreditCategory),
}

/// Gating configuration for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureConfig {
    pub key: FeatureKey,
    /// Human-readable label for upgrade prompts.
    pub label: &'static str,
    /// Minimum tier whose rank unlocks the feature.
    pub min_tier: PlanTier,
    pub metering: Metering,
}

/// Returns the configuration for a feature key.
///
/// The match is total over [`FeatureKey`], so configuration can never be
/// missing at runtime.
pub fn feature_config(key: FeatureKey) -> FeatureConfig {
    match key {
        FeatureKey::PriceCheck => FeatureConfig {
            key,
            label: "Price check",
            min_tier: PlanTier::Free,
            metering: Metering::Credits(CreditCategory::PriceChecks),
        },
        FeatureKey::ListingOptimize => FeatureConfig {
            key,
            label: "Listing optimisation",
            min_tier: PlanTier::Free,
            metering: Metering::Credits(CreditCategory::Optimisations),
        },
        FeatureKey::TranslateListing => FeatureConfig {
            key,
            label: "Listing translation",
            min_tier: PlanTier::Starter,
            metering: Metering::Credits(CreditCategory::Optimisations),
        },
        FeatureKey::BulkOptimize => FeatureConfig {
            key,
            label: "Bulk optimisation",
            min_tier: PlanTier::Pro,
            metering: Metering::Credits(CreditCategory::Optimisations),
        },
        FeatureKey::BackgroundRemoval => FeatureConfig {
            key,
            label: "Background removal",
            min_tier: PlanTier::Starter,
            metering: Metering::Credits(CreditCategory::PhotoStudio),
        },
        FeatureKey::PhotoEnhance => FeatureConfig {
            key,
            label: "Photo enhancement",
            min_tier: PlanTier::Starter,
            metering: Metering::Credits(CreditCategory::PhotoStudio),
        },
        FeatureKey::TrendDiscovery => FeatureConfig {
            key,
            label: "Trend discovery",
            min_tier: PlanTier::Pro,
            metering: Metering::None,
        },
        FeatureKey::CrossPublish => FeatureConfig {
            key,
            label: "Cross-platform publishing",
            min_tier: PlanTier::Business,
            metering: Metering::None,
        },
        FeatureKey::SellWizard => FeatureConfig {
            key,
            label: "Sell wizard",
            min_tier: PlanTier::Free,
            metering: Metering::Credits(CreditCategory::Optimisations),
        },
    }
}
