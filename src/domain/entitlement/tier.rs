//! Subscription plan tiers.
//!
//! Represents the plan levels available to Flipkit resellers.

use serde::{Deserialize, Serialize};

/// Subscription plan tier.
///
/// Determines feature access and the monthly credit allotment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// Free tier - price checks and basic optimisation, good for evaluation.
    Free,

    /// Starter tier - unlocks translation and the photo studio.
    Starter,

    /// Pro tier - unlocks bulk optimisation and trend discovery.
    Pro,

    /// Business tier - unlocks cross-platform publishing.
    Business,
}

impl PlanTier {
    /// Returns true if this tier is a paid tier.
    pub fn is_paid(&self) -> bool {
        !matches!(self, PlanTier::Free)
    }

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanTier::Free => "Free",
            PlanTier::Starter => "Starter",
            PlanTier::Pro => "Pro",
            PlanTier::Business => "Business",
        }
    }

    /// Returns the numeric rank of this tier for comparison.
    ///
    /// Higher rank = more features. Used for "at least tier X" checks.
    pub fn rank(&self) -> u8 {
        match self {
            PlanTier::Free => 0,
            PlanTier::Starter => 1,
            PlanTier::Pro => 2,
            PlanTier::Business => 3,
        }
    }

    /// Parses a tier name, defaulting to `Free` for anything unrecognized.
    ///
    /// Entitlement lookups must fail closed: a tier name this build does not
    /// know grants the least access, never an error.
    pub fn parse_or_free(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "free" => PlanTier::Free,
            "starter" => PlanTier::Starter,
            "pro" => PlanTier::Pro,
            "business" => PlanTier::Business,
            _ => PlanTier::Free,
        }
    }

    /// Returns the lowercase storage name for this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Starter => "starter",
            PlanTier::Pro => "pro",
            PlanTier::Business => "business",
        }
    }

    /// All tiers in ascending rank order.
    pub const ALL: [PlanTier; 4] = [
        PlanTier::Free,
        PlanTier::Starter,
        PlanTier::Pro,
        PlanTier::Business,
    ];
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_tier_is_not_paid() {
        assert!(!PlanTier::Free.is_paid());
    }

    #[test]
    fn paid_tiers_are_paid() {
        assert!(PlanTier::Starter.is_paid());
        assert!(PlanTier::Pro.is_paid());
        assert!(PlanTier::Business.is_paid());
    }

    #[test]
    fn ranks_form_a_total_order() {
        let ranks: Vec<u8> = PlanTier::ALL.iter().map(|t| t.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn unknown_tier_parses_as_free() {
        assert_eq!(PlanTier::parse_or_free("scale"), PlanTier::Free);
        assert_eq!(PlanTier::parse_or_free(""), PlanTier::Free);
        assert_eq!(PlanTier::parse_or_free("platinum"), PlanTier::Free);
    }

    #[test]
    fn known_tiers_parse_case_insensitively() {
        assert_eq!(PlanTier::parse_or_free("Business"), PlanTier::Business);
        assert_eq!(PlanTier::parse_or_free("PRO"), PlanTier::Pro);
    }

    #[test]
    fn tier_serializes_lowercase() {
        let json = serde_json::to_string(&PlanTier::Starter).unwrap();
        assert_eq!(json, "\"starter\"");
    }

    #[test]
    fn tier_deserializes_from_lowercase() {
        let tier: PlanTier = serde_json::from_str("\"business\"").unwrap();
        assert_eq!(tier, PlanTier::Business);
    }

    #[test]
    fn as_str_roundtrips_through_parse() {
        for tier in PlanTier::ALL {
            assert_eq!(PlanTier::parse_or_free(tier.as_str()), tier);
        }
    }
}
