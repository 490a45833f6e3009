// ✅ Input Quality Log
// Every cell the normalizer had to zero out gets a trail entry.
// Issues never change a computed value; they only explain it.

use crate::normalize::{inspect, Outcome, RawValue};
use serde::{Deserialize, Serialize};

// ============================================================================
// ISSUES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning, // Value was present but unusable; stored as 0
    Info,    // Expected placeholder (e.g. "$ -"); stored as 0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssue {
    pub record_id: i64,
    pub field: String,
    pub raw: String,
    pub severity: Severity,
}

impl QualityIssue {
    /// Classify one normalized cell; `None` when there is nothing to report
    pub fn from_cell(record_id: i64, field: &str, value: &RawValue) -> Option<Self> {
        let severity = match inspect(value).outcome {
            Outcome::Parsed | Outcome::Missing => return None,
            Outcome::Sentinel => Severity::Info,
            Outcome::Malformed => Severity::Warning,
        };

        let raw = match value {
            RawValue::Text(s) => s.clone(),
            RawValue::Number(n) => n.to_string(),
            RawValue::Missing => String::new(),
            RawValue::Other(v) => v.to_string(),
        };

        Some(QualityIssue {
            record_id,
            field: field.to_string(),
            raw,
            severity,
        })
    }
}

// ============================================================================
// LOG
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityLog {
    pub issues: Vec<QualityIssue>,
}

impl QualityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = QualityIssue>) {
        self.issues.extend(issues);
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn info_count(&self) -> usize {
        self.count(Severity::Info)
    }

    /// Distinct record ids with at least one warning
    pub fn affected_records(&self) -> usize {
        let mut ids: Vec<i64> = self
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .map(|i| i.record_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} malformed values across {} records, {} placeholders",
            self.warning_count(),
            self.affected_records(),
            self.info_count()
        )
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

// ============================================================================
// TESTS
// ============================================================================
