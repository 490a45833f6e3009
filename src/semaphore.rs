// 🚦 Semaphores - closed status palette and the per-module classifications

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// PALETTE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Semaphore {
    Green,
    Yellow,
    Red,
    Critical,
    Gray,
}

/// Keyword groups, checked in order. Critical comes before red so that
/// "muy_baja" is not swallowed by the "baja" keyword.
/// The workbook's own tier-color helper checks "baja" first and so paints
/// "muy_baja" red; critical is the intended mapping here, keep this order.
const KEYWORDS: [(Semaphore, &[&str]); 4] = [
    (Semaphore::Green, &["alta", "favorable", "óptimo", "optimo", "green"]),
    (Semaphore::Yellow, &["media", "estándar", "estandar", "yellow"]),
    (Semaphore::Critical, &["muy_baja", "muy baja", "crítico", "critico", "critical"]),
    (Semaphore::Red, &["baja", "revisar", "red"]),
];

impl Semaphore {
    /// Map a free-text status / semaphore label onto the palette
    ///
    /// Case-insensitive keyword containment; anything unrecognized (or no
    /// input at all) is gray.
    pub fn from_status(status: Option<&str>) -> Semaphore {
        let Some(status) = status else {
            return Semaphore::Gray;
        };
        let text = status.to_lowercase();

        KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
            .map(|(color, _)| *color)
            .unwrap_or(Semaphore::Gray)
    }

    /// Market benchmark color from the signed deviation fraction
    pub fn from_market_deviation(deviation: f64) -> Semaphore {
        if deviation <= 0.0 {
            Semaphore::Green
        } else if deviation <= 0.5 {
            Semaphore::Yellow
        } else {
            Semaphore::Red
        }
    }

    /// Efficiency color from the global deviation index (0 = not computed)
    pub fn from_efficiency_index(index: f64) -> Semaphore {
        if index == 0.0 {
            Semaphore::Gray
        } else if index < 1.0 {
            Semaphore::Green
        } else if index <= 1.25 {
            Semaphore::Yellow
        } else {
            Semaphore::Red
        }
    }

    /// Points used by the weighted global status
    pub fn points(&self) -> f64 {
        match self {
            Semaphore::Green => 10.0,
            Semaphore::Yellow => 5.0,
            Semaphore::Red => 2.0,
            Semaphore::Critical => 0.0,
            Semaphore::Gray => 5.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Semaphore::Green => "green",
            Semaphore::Yellow => "yellow",
            Semaphore::Red => "red",
            Semaphore::Critical => "critical",
            Semaphore::Gray => "gray",
        }
    }
}

impl fmt::Display for Semaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PERFORMANCE CLASSIFICATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceClass {
    High,
    Medium,
    Low,
    VeryLow,
}

impl PerformanceClass {
    /// Evaluated high to low
    pub fn from_score(score: f64) -> Self {
        if score >= 60.0 {
            PerformanceClass::High
        } else if score >= 40.0 {
            PerformanceClass::Medium
        } else if score >= 5.0 {
            PerformanceClass::Low
        } else {
            PerformanceClass::VeryLow
        }
    }

    /// Semaphore label as it appears in the source workbook
    pub fn label(&self) -> &'static str {
        match self {
            PerformanceClass::High => "alta",
            PerformanceClass::Medium => "media",
            PerformanceClass::Low => "baja",
            PerformanceClass::VeryLow => "muy_baja",
        }
    }

    pub fn semaphore(&self) -> Semaphore {
        Semaphore::from_status(Some(self.label()))
    }
}

// ============================================================================
// EFFICIENCY CLASSIFICATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EfficiencyClass {
    Review,
    Standard,
    Favorable,
}

impl EfficiencyClass {
    pub fn from_index(index: f64) -> Self {
        if index > 1.25 {
            EfficiencyClass::Review
        } else if index < 0.85 {
            EfficiencyClass::Favorable
        } else {
            EfficiencyClass::Standard
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
