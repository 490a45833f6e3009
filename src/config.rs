// ⚙️ Engine Configuration - denylist, tier table and weights as data
// Loaded once at startup and threaded through the engine; no globals.

use crate::error::ConfigError;
use anyhow::{Context as AnyhowContext, Result};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Venues that are reported but never scored, in display order
const DEFAULT_EXCLUDED_IDS: [i64; 12] = [82, 102, 117, 94, 98, 129, 133, 134, 119, 99, 7, 122];

/// Default place/venue keyword → tier table, in match order
const DEFAULT_TIER_TABLE: [(&str, u8); 22] = [
    ("sans souci", 1),
    ("costanera", 1),
    ("alto avellaneda", 1),
    ("dot", 1),
    ("palermo", 2),
    ("belgrano", 2),
    ("pilar", 2),
    ("recoleta", 2),
    ("nuñez", 2),
    ("canning", 3),
    ("hudson", 3),
    ("caballito", 3),
    ("esteban echeverria", 3),
    ("ramos mejia", 4),
    ("san martin", 4),
    ("la plata", 4),
    ("avellaneda", 4),
    ("lanus", 4),
    ("villa luzuriaga", 5),
    ("merlo", 5),
    ("moreno", 5),
    ("gonzalez catan", 5),
];

// ============================================================================
// CONFIG TYPES
// ============================================================================

/// One row of the tier lookup table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierKeyword {
    /// Lowercase substring matched against venue name / municipality
    pub keyword: String,

    /// Tier 1 (top) ..= 5
    pub tier: u8,
}

impl TierKeyword {
    pub fn new(keyword: impl Into<String>, tier: u8) -> Self {
        TierKeyword {
            keyword: keyword.into(),
            tier,
        }
    }
}

/// Relative weight of each semaphore in the global venue status
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategicWeights {
    pub performance: f64,
    pub benchmarking: f64,
    pub efficiency: f64,
    /// Contract audit (agreed vs. paid rent)
    pub audit: f64,
}

impl Default for StrategicWeights {
    fn default() -> Self {
        StrategicWeights {
            performance: 40.0,
            benchmarking: 25.0,
            efficiency: 20.0,
            audit: 15.0,
        }
    }
}

impl StrategicWeights {
    pub fn total(&self) -> f64 {
        self.performance + self.benchmarking + self.efficiency + self.audit
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Ordered denylist of venue ids
    #[serde(default = "default_excluded_ids")]
    pub excluded_ids: Vec<i64>,

    /// Ordered keyword → tier table
    #[serde(default = "default_tier_table")]
    pub tier_table: Vec<TierKeyword>,

    /// Year stamped on records that don't carry one
    #[serde(default = "default_reporting_year")]
    pub reporting_year: i32,

    #[serde(default)]
    pub weights: StrategicWeights,
}

fn default_excluded_ids() -> Vec<i64> {
    DEFAULT_EXCLUDED_IDS.to_vec()
}

fn default_tier_table() -> Vec<TierKeyword> {
    DEFAULT_TIER_TABLE
        .iter()
        .map(|(keyword, tier)| TierKeyword::new(*keyword, *tier))
        .collect()
}

fn default_reporting_year() -> i32 {
    chrono::Utc::now().year()
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            excluded_ids: default_excluded_ids(),
            tier_table: default_tier_table(),
            reporting_year: default_reporting_year(),
            weights: StrategicWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Load config from a JSON file; missing keys fall back to defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: EngineConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Trim and lowercase tier keywords so matching is case-insensitive
    pub fn normalized(mut self) -> Self {
        for entry in &mut self.tier_table {
            entry.keyword = entry.keyword.trim().to_lowercase();
        }
        self
    }

    /// Reject a malformed denylist, tier table or weight set
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let mut seen_ids = HashSet::new();
        for id in &self.excluded_ids {
            if !seen_ids.insert(*id) {
                return Err(ConfigError::DuplicateExcludedId(*id));
            }
        }

        let mut seen_keywords = HashSet::new();
        for (index, entry) in self.tier_table.iter().enumerate() {
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
            if !seen_keywords.insert(keyword.clone()) {
                return Err(ConfigError::DuplicateKeyword(keyword));
            }
        }

        let w = &self.weights;
        let all_valid = [w.performance, w.benchmarking, w.efficiency, w.audit]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0);
        if !all_valid {
            return Err(ConfigError::InvalidWeights);
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
