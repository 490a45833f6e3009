// 🏷️ Tier Assigner - keyword rules as data
// Deterministic (name, municipality) → tier 1..=5 lookup

use crate::config::TierKeyword;
use crate::error::ConfigError;

/// Tier used when neither the name nor the municipality matches
pub const FALLBACK_TIER: u8 = 4;

/// Tier used when a supplied tier cannot be read
pub const UNKNOWN_TIER: u8 = 5;

// ============================================================================
// TIER RESOLUTION
// ============================================================================

/// How a record's tier was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierSource {
    /// Supplied upstream and kept (only reformatted)
    Supplied,
    /// Venue name contains a tier-1 keyword
    NameMatch,
    /// Municipality contains a table keyword
    MunicipalityMatch,
    /// Nothing matched
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierAssignment {
    pub tier: u8,
    pub source: TierSource,
}

// ============================================================================
// TIER ASSIGNER
// ============================================================================

pub struct TierAssigner {
    /// Keywords in table definition order (already lowercase)
    table: Vec<TierKeyword>,
}

impl TierAssigner {
    /// Build from a tier table; rejects out-of-range tiers and empty keywords
    pub fn new(table: &[TierKeyword]) -> Result<Self, ConfigError> {
        let mut rules = Vec::with_capacity(table.len());

        for (index, entry) in table.iter().enumerate() {
            let keyword = entry.keyword.trim().to_lowercase();
            if keyword.is_empty() {
                return Err(ConfigError::EmptyKeyword(index));
            }
            if !(1..=5).contains(&entry.tier) {
                return Err(ConfigError::TierOutOfRange {
                    keyword,
                    tier: entry.tier,
                });
            }
            rules.push(TierKeyword::new(keyword, entry.tier));
        }

        Ok(TierAssigner { table: rules })
    }

    /// Resolve a record's tier
    ///
    /// A non-blank supplied tier wins and is only reformatted; otherwise the
    /// lookup runs.
    pub fn resolve(&self, supplied: Option<&str>, name: &str, municipality: Option<&str>) -> TierAssignment {
        match supplied.map(str::trim).filter(|s| !s.is_empty()) {
            Some(text) => TierAssignment {
                tier: parse_supplied_tier(text),
                source: TierSource::Supplied,
            },
            None => self.assign(name, municipality),
        }
    }

    /// Keyword lookup
    ///
    /// 1. A tier-1 keyword in the venue name → tier 1
    /// 2. First table keyword contained in the municipality → its tier
    /// 3. Otherwise the fallback tier
    pub fn assign(&self, name: &str, municipality: Option<&str>) -> TierAssignment {
        let normalized_name = name.to_lowercase();
        let name_hit = self
            .table
            .iter()
            .any(|rule| rule.tier == 1 && normalized_name.contains(&rule.keyword));
        if name_hit {
            return TierAssignment {
                tier: 1,
                source: TierSource::NameMatch,
            };
        }

        if let Some(municipality) = municipality {
            let normalized_muni = municipality.trim().to_lowercase();
            if let Some(rule) = self.table.iter().find(|rule| normalized_muni.contains(&rule.keyword)) {
                return TierAssignment {
                    tier: rule.tier,
                    source: TierSource::MunicipalityMatch,
                };
            }
        }

        TierAssignment {
            tier: FALLBACK_TIER,
            source: TierSource::Fallback,
        }
    }

    /// Get number of keywords loaded
    pub fn rule_count(&self) -> usize {
        self.table.len()
    }
}

/// "Tier 3", "tier_2", "3", "3.0" → 3. Unreadable or out of range → 5.
pub fn parse_supplied_tier(text: &str) -> u8 {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    match digits.parse::<u8>() {
        Ok(tier) if (1..=5).contains(&tier) => tier,
        _ => UNKNOWN_TIER,
    }
}

// ============================================================================
// TESTS
// ============================================================================
