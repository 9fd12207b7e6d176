//! Deterministic tier resolution.
//!
//! Resolution order, first match wins:
//! 1. tier-map lookup by (cognition band, collapsed support band)
//! 2. score threshold bucket
//! 3. first allowed tier in [`CareTier::FALLBACK_ORDER`]
//! 4. [`CareTier::HARD_DEFAULT`]
//!
//! Steps 1-3 only accept tiers present in the allowed set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::gating::{BandSnapshot, CognitionBand, SupportBand};
use crate::schema::load_json_file;
use crate::tier::{AllowedTiers, CareTier};

/// Lookup table from (cognition band, support band) to a tier.
///
/// Serialized as nested objects, e.g. `{"mild": {"low": "in_home"}}`.
/// Missing cells are allowed and simply fall through to the score. A `24h`
/// column is rejected: lookups route 24h support as `high`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Cells", into = "Cells")]
pub struct TierMap(Cells);

type Cells = BTreeMap<CognitionBand, BTreeMap<SupportBand, CareTier>>;

impl TryFrom<Cells> for TierMap {
    type Error = String;

    fn try_from(cells: Cells) -> std::result::Result<Self, Self::Error> {
        for (cog, row) in &cells {
            if row.contains_key(&SupportBand::AroundTheClock) {
                return Err(format!(
                    "tier map row '{}' has a '24h' column; 24h support is routed as 'high'",
                    cog.as_str()
                ));
            }
        }
        Ok(Self(cells))
    }
}

impl From<TierMap> for Cells {
    fn from(map: TierMap) -> Self {
        map.0
    }
}

impl TierMap {
    /// Empty map; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Map shipped with the crate.
    pub fn standard() -> Self {
        use CareTier as T;
        use CognitionBand as C;
        use SupportBand as S;

        let rows = [
            (C::None, [T::None, T::InHome, T::AssistedLiving]),
            (C::Mild, [T::InHome, T::InHome, T::AssistedLiving]),
            (C::Moderate, [T::AssistedLiving, T::AssistedLiving, T::MemoryCare]),
            (C::High, [T::MemoryCare, T::MemoryCare, T::MemoryCareHighAcuity]),
        ];

        let mut map = Self::empty();
        for (cog, tiers) in rows {
            for (sup, tier) in [S::Low, S::Moderate, S::High].into_iter().zip(tiers) {
                map.insert(cog, sup, tier);
            }
        }
        map
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| crate::Error::config(format!("invalid tier map: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        load_json_file(path)
    }

    pub fn insert(&mut self, cog: CognitionBand, sup: SupportBand, tier: CareTier) {
        self.0.entry(cog).or_default().insert(sup.for_routing(), tier);
    }

    /// Look up a cell. The support band is collapsed before lookup.
    pub fn lookup(&self, cog: CognitionBand, sup: SupportBand) -> Option<CareTier> {
        self.0.get(&cog)?.get(&sup.for_routing()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }
}

/// Which resolution step produced the deterministic tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierSource {
    TierMap,
    Score,
    Fallback,
    HardDefault,
}

/// Deterministic tier plus the step that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTier {
    pub tier: CareTier,
    pub source: TierSource,
}

/// Resolve the deterministic tier for one request.
pub fn resolve_tier(
    map: &TierMap,
    bands: BandSnapshot,
    total_score: f64,
    allowed: &AllowedTiers,
) -> ResolvedTier {
    let resolved = map
        .lookup(bands.cog, bands.sup)
        .filter(|tier| allowed.contains(*tier))
        .map(|tier| ResolvedTier {
            tier,
            source: TierSource::TierMap,
        })
        .or_else(|| {
            let by_score = CareTier::from_score(total_score);
            allowed.contains(by_score).then_some(ResolvedTier {
                tier: by_score,
                source: TierSource::Score,
            })
        })
        .or_else(|| {
            CareTier::FALLBACK_ORDER
                .into_iter()
                .find(|tier| allowed.contains(*tier))
                .map(|tier| ResolvedTier {
                    tier,
                    source: TierSource::Fallback,
                })
        })
        .unwrap_or(ResolvedTier {
            tier: CareTier::HARD_DEFAULT,
            source: TierSource::HardDefault,
        });

    debug!(
        tier = %resolved.tier,
        source = ?resolved.source,
        cog = %bands.cog,
        sup = %bands.sup,
        total_score,
        "Deterministic tier resolved"
    );
    resolved
}
