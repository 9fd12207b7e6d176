//! Canonical care tiers, score thresholds and the allowed-tier set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Closed set of care tiers, ordered by acuity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareTier {
    None,
    InHome,
    AssistedLiving,
    MemoryCare,
    MemoryCareHighAcuity,
}

impl CareTier {
    /// All tiers in ascending acuity order.
    pub const ALL: [CareTier; 5] = [
        CareTier::None,
        CareTier::InHome,
        CareTier::AssistedLiving,
        CareTier::MemoryCare,
        CareTier::MemoryCareHighAcuity,
    ];

    /// Tiers that require cognitive eligibility.
    pub const MEMORY_CARE: [CareTier; 2] = [CareTier::MemoryCare, CareTier::MemoryCareHighAcuity];

    /// Preference order when neither the tier map nor the score yields an allowed tier.
    pub const FALLBACK_ORDER: [CareTier; 5] = [
        CareTier::AssistedLiving,
        CareTier::InHome,
        CareTier::None,
        CareTier::MemoryCare,
        CareTier::MemoryCareHighAcuity,
    ];

    /// Tier used when every other resolution path comes up empty.
    pub const HARD_DEFAULT: CareTier = CareTier::AssistedLiving;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::InHome => "in_home",
            Self::AssistedLiving => "assisted_living",
            Self::MemoryCare => "memory_care",
            Self::MemoryCareHighAcuity => "memory_care_high_acuity",
        }
    }

    /// Parse a canonical tier identifier. Anything else is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.as_str() == value)
    }

    /// Display label used in rationale lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "No Care Needed",
            Self::InHome => "In-Home Care",
            Self::AssistedLiving => "Assisted Living",
            Self::MemoryCare => "Memory Care",
            Self::MemoryCareHighAcuity => "Memory Care (High Acuity)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::None => "Individual is managing well independently",
            Self::InHome => "Needs regular assistance at home",
            Self::AssistedLiving => "Needs help with daily activities in supportive environment",
            Self::MemoryCare => "Needs specialized memory care support",
            Self::MemoryCareHighAcuity => "Needs intensive memory care with 24/7 supervision",
        }
    }

    /// Inclusive score range `(min, max)` for this tier.
    pub fn threshold(&self) -> (f64, f64) {
        match self {
            Self::None => (0.0, 8.0),
            Self::InHome => (9.0, 16.0),
            Self::AssistedLiving => (17.0, 24.0),
            Self::MemoryCare => (25.0, 39.0),
            Self::MemoryCareHighAcuity => (40.0, 100.0),
        }
    }

    pub fn midpoint(&self) -> f64 {
        let (min, max) = self.threshold();
        (min + max) / 2.0
    }

    /// Bucket a total score into a tier.
    ///
    /// Ranges are treated as contiguous: a score belongs to the first tier whose
    /// upper bound it does not exceed, so fractional scores between two integer
    /// ranges land in the higher one and anything above 100 is high acuity.
    pub fn from_score(score: f64) -> Self {
        Self::ALL
            .into_iter()
            .find(|tier| score <= tier.threshold().1)
            .unwrap_or(Self::MemoryCareHighAcuity)
    }

    pub fn is_memory_care(&self) -> bool {
        Self::MEMORY_CARE.contains(self)
    }

    /// Position in the canonical acuity order.
    pub fn rank(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for CareTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive entry for rendering tier explanations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierInfo {
    pub tier: CareTier,
    pub label: &'static str,
    pub description: &'static str,
    pub score_range: (f64, f64),
}

/// Label, description and score range for every canonical tier.
pub fn tier_catalog() -> Vec<TierInfo> {
    CareTier::ALL
        .into_iter()
        .map(|tier| TierInfo {
            tier,
            label: tier.label(),
            description: tier.description(),
            score_range: tier.threshold(),
        })
        .collect()
}

/// Request-scoped set of reachable tiers. Starts full and only ever shrinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowedTiers(BTreeSet<CareTier>);

impl Default for AllowedTiers {
    fn default() -> Self {
        Self::all()
    }
}

impl AllowedTiers {
    pub fn all() -> Self {
        Self(CareTier::ALL.into_iter().collect())
    }

    pub fn contains(&self, tier: CareTier) -> bool {
        self.0.contains(&tier)
    }

    /// Remove both memory-care tiers. Returns true if anything was removed.
    pub fn remove_memory_care(&mut self) -> bool {
        let mut removed = false;
        for tier in CareTier::MEMORY_CARE {
            removed |= self.0.remove(&tier);
        }
        removed
    }

    pub fn is_restricted(&self) -> bool {
        self.0.len() < CareTier::ALL.len()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tiers in canonical acuity order.
    pub fn to_vec(&self) -> Vec<CareTier> {
        self.0.iter().copied().collect()
    }

    /// Tier identifiers sorted alphabetically, as presented to the model.
    pub fn sorted_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.0.iter().map(CareTier::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FromIterator<CareTier> for AllowedTiers {
    fn from_iter<I: IntoIterator<Item = CareTier>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_canonical_names() {
        for tier in CareTier::ALL {
            assert_eq!(CareTier::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(CareTier::parse("skilled_nursing"), None);
        assert_eq!(CareTier::parse("Assisted_Living"), None);
    }

    #[test]
    fn test_from_score_boundaries() {
        assert_eq!(CareTier::from_score(0.0), CareTier::None);
        assert_eq!(CareTier::from_score(8.0), CareTier::None);
        assert_eq!(CareTier::from_score(8.5), CareTier::InHome);
        assert_eq!(CareTier::from_score(9.0), CareTier::InHome);
        assert_eq!(CareTier::from_score(16.0), CareTier::InHome);
        assert_eq!(CareTier::from_score(17.0), CareTier::AssistedLiving);
        assert_eq!(CareTier::from_score(24.0), CareTier::AssistedLiving);
        assert_eq!(CareTier::from_score(25.0), CareTier::MemoryCare);
        assert_eq!(CareTier::from_score(39.0), CareTier::MemoryCare);
        assert_eq!(CareTier::from_score(40.0), CareTier::MemoryCareHighAcuity);
        assert_eq!(CareTier::from_score(250.0), CareTier::MemoryCareHighAcuity);
        assert_eq!(CareTier::from_score(-3.0), CareTier::None);
    }

    #[test]
    fn test_midpoints() {
        assert_eq!(CareTier::None.midpoint(), 4.0);
        assert_eq!(CareTier::InHome.midpoint(), 12.5);
        assert_eq!(CareTier::AssistedLiving.midpoint(), 20.5);
        assert_eq!(CareTier::MemoryCare.midpoint(), 32.0);
        assert_eq!(CareTier::MemoryCareHighAcuity.midpoint(), 70.0);
    }

    #[test]
    fn test_allowed_tiers_only_shrink() {
        let mut allowed = AllowedTiers::all();
        assert!(!allowed.is_restricted());
        assert!(allowed.remove_memory_care());
        assert!(!allowed.remove_memory_care());
        assert!(allowed.is_restricted());
        assert_eq!(
            allowed.to_vec(),
            vec![CareTier::None, CareTier::InHome, CareTier::AssistedLiving]
        );
        assert_eq!(
            allowed.sorted_names(),
            vec!["assisted_living", "in_home", "none"]
        );
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&CareTier::MemoryCareHighAcuity).unwrap();
        assert_eq!(json, "\"memory_care_high_acuity\"");
        let allowed: AllowedTiers = serde_json::from_str("[\"none\",\"in_home\"]").unwrap();
        assert_eq!(allowed.len(), 2);
    }

    #[test]
    fn test_catalog_covers_all_tiers() {
        let catalog = tier_catalog();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog[4].label, "Memory Care (High Acuity)");
        assert_eq!(catalog[1].score_range, (9.0, 16.0));
    }
}
