// 🏗️ Scoring Engine - normalize → tiers → partition → modules → recombine

use crate::benchmarking;
use crate::config::EngineConfig;
use crate::efficiency::{self, EfficiencySummary};
use crate::error::ConfigError;
use crate::output::{VenueColors, VenueOutput};
use crate::partition::partition;
use crate::profitability::{self, ProfitabilitySummary};
use crate::quality::QualityLog;
use crate::record::{RawRecord, VenueRecord};
use crate::status::{global_status, GlobalStatus};
use crate::tiers::{TierAssigner, TierSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ============================================================================
// RUN REPORT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub total_records: usize,
    pub excluded: usize,
    pub processable: usize,
    pub duplicate_ids: Vec<i64>,
    pub tiers_supplied: usize,
    pub tiers_assigned: usize,
    pub profitability: ProfitabilitySummary,
    pub benchmark_eligible: usize,
    pub efficiency: EfficiencySummary,
    pub malformed_values: usize,
    pub placeholder_values: usize,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format!(
            "{} venues ({} excluded) | profitability {} | benchmark {} | efficiency {}/{} indexed | {} malformed values",
            self.total_records,
            self.excluded,
            self.profitability.eligible,
            self.benchmark_eligible,
            self.efficiency.indexed,
            self.efficiency.eligible,
            self.malformed_values
        )
    }
}

/// ScoringRun - one pipeline execution over one input set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringRun {
    pub run_id: Uuid,
    pub processed_at: DateTime<Utc>,
    /// Processable venues in input order, then excluded venues in denylist order
    pub records: Vec<VenueRecord>,
    pub report: RunReport,
    #[serde(skip)]
    pub quality: QualityLog,
}

impl ScoringRun {
    pub fn outputs(&self) -> Vec<VenueOutput> {
        self.records.iter().map(VenueOutput::from).collect()
    }

    pub fn find(&self, id: i64) -> Option<&VenueRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct ScoringEngine {
    config: EngineConfig,
    tiers: TierAssigner,
}

impl ScoringEngine {
    /// Validate the configuration and build the engine
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let config = config.normalized();
        config.validate()?;
        let tiers = TierAssigner::new(&config.tier_table)?;

        debug!(
            excluded_ids = config.excluded_ids.len(),
            tier_keywords = tiers.rule_count(),
            "scoring engine ready"
        );

        Ok(ScoringEngine { config, tiers })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Global status of one scored venue under the configured weights
    pub fn status_of(&self, record: &VenueRecord) -> GlobalStatus {
        global_status(&VenueColors::of(record), &self.config.weights)
    }

    /// Run the full pipeline over a raw record set
    pub fn run(&self, raw: &[RawRecord]) -> ScoringRun {
        let mut report = RunReport {
            total_records: raw.len(),
            ..RunReport::default()
        };
        let mut quality = QualityLog::new();

        // Normalize every row
        let mut records = Vec::with_capacity(raw.len());
        for (position, row) in raw.iter().enumerate() {
            let (record, issues) = VenueRecord::from_raw(row, position, self.config.reporting_year);
            for issue in &issues {
                debug!(id = issue.record_id, field = %issue.field, raw = %issue.raw, "value normalized to 0");
            }
            quality.extend(issues);
            records.push(record);
        }

        report.duplicate_ids = duplicate_ids(&records);
        if !report.duplicate_ids.is_empty() {
            warn!(ids = ?report.duplicate_ids, "duplicate venue ids in input");
        }

        // Tiers are independent of the modules but benchmarking and
        // efficiency both read them, so resolve first
        for record in &mut records {
            let assignment = self.tiers.resolve(
                record.supplied_tier.as_deref(),
                &record.name,
                record.municipality.as_deref(),
            );
            record.priority_tier = assignment.tier;
            match assignment.source {
                TierSource::Supplied => report.tiers_supplied += 1,
                _ => report.tiers_assigned += 1,
            }
        }

        let mut parts = partition(records, &self.config.excluded_ids);
        report.excluded = parts.excluded.len();
        report.processable = parts.processable.len();

        report.profitability = profitability::apply(&mut parts.processable);
        report.benchmark_eligible = benchmarking::apply(&mut parts.processable);
        report.efficiency = efficiency::apply(&mut parts.processable);

        report.malformed_values = quality.warning_count();
        report.placeholder_values = quality.info_count();
        if report.malformed_values > 0 {
            warn!(summary = %quality.summary(), "malformed input values");
        }

        let run = ScoringRun {
            run_id: Uuid::new_v4(),
            processed_at: Utc::now(),
            records: parts.recombine(),
            report,
            quality,
        };

        info!(run_id = %run.run_id, "{}", run.report.summary());
        run
    }
}

fn duplicate_ids(records: &[VenueRecord]) -> Vec<i64> {
    let mut seen = HashSet::new();
    let mut duplicates: Vec<i64> = records
        .iter()
        .filter(|r| !seen.insert(r.id))
        .map(|r| r.id)
        .collect();
    duplicates.sort_unstable();
    duplicates.dedup();
    duplicates
}

// ============================================================================
// TESTS
// ============================================================================
