// 🧭 Global Venue Status, contract audit and the rent what-if simulator

use crate::config::StrategicWeights;
use crate::output::VenueColors;
use crate::semaphore::Semaphore;
use serde::{Deserialize, Serialize};

/// Pesos per dollar used when a contract is quoted in USD
pub const DEFAULT_USD_ARS_RATE: f64 = 1470.0;

// ============================================================================
// GLOBAL STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLabel {
    Efficient,
    Watch,
    Renegotiate,
    UrgentAction,
    Unweighted,
}

impl StatusLabel {
    pub fn description(&self) -> &'static str {
        match self {
            StatusLabel::Efficient => "Healthy operation; meets profitability and market standards.",
            StatusLabel::Watch => "Minor deviations detected; monitor before acting.",
            StatusLabel::Renegotiate => "Several indicators off-market; the asset is inefficient against peers.",
            StatusLabel::UrgentAction => "Profitability compromised; renegotiate or review costs now.",
            StatusLabel::Unweighted => "Assign weights to compute the status.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStatus {
    pub score: f64,
    pub color: Semaphore,
    pub label: StatusLabel,
    pub description: String,
}

/// Weighted mean of the four semaphores (points per color: green 10,
/// yellow 5, red 2, critical 0, gray 5)
pub fn global_status(colors: &VenueColors, weights: &StrategicWeights) -> GlobalStatus {
    let total = weights.total();
    if total <= 0.0 {
        return status(0.0, Semaphore::Yellow, StatusLabel::Unweighted);
    }

    let score = (colors.performance.points() * weights.performance
        + colors.benchmark.points() * weights.benchmarking
        + colors.efficiency.points() * weights.efficiency
        + colors.audit.points() * weights.audit)
        / total;

    if score >= 8.5 {
        status(score, Semaphore::Green, StatusLabel::Efficient)
    } else if score >= 5.0 {
        status(score, Semaphore::Yellow, StatusLabel::Watch)
    } else if score >= 2.5 {
        status(score, Semaphore::Red, StatusLabel::Renegotiate)
    } else {
        status(score, Semaphore::Red, StatusLabel::UrgentAction)
    }
}

fn status(score: f64, color: Semaphore, label: StatusLabel) -> GlobalStatus {
    GlobalStatus {
        score,
        color,
        label,
        description: label.description().to_string(),
    }
}

// ============================================================================
// CONTRACT AUDIT
// ============================================================================

/// Agreed rent vs. rent actually paid, both in pesos
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAudit {
    pub contract_amount: f64,
    pub real_payment: f64,
    pub deviation: f64,
    /// Percentage units; positive = paying more than agreed
    pub deviation_percent: f64,
    pub color: Semaphore,
}

impl ContractAudit {
    /// Audit of a venue whose contract is its recorded fixed cost
    ///
    /// Without a separate contract figure the payment matches by
    /// construction, so the audit is green.
    pub fn reconciled(fixed_costs: f64) -> Self {
        contract_deviation(fixed_costs, fixed_costs, 1.0)
    }
}

/// Compare a USD contract against the peso payment
///
/// |deviation| ≤ 5% green, ≤ 15% yellow, otherwise red. A non-positive
/// contract amount reads as 0% deviation.
pub fn contract_deviation(contract_amount_usd: f64, real_payment_ars: f64, usd_ars_rate: f64) -> ContractAudit {
    let contract_amount = contract_amount_usd * usd_ars_rate;
    let deviation = real_payment_ars - contract_amount;
    let deviation_percent = if contract_amount > 0.0 {
        deviation / contract_amount * 100.0
    } else {
        0.0
    };

    let color = match deviation_percent.abs() {
        d if d <= 5.0 => Semaphore::Green,
        d if d <= 15.0 => Semaphore::Yellow,
        _ => Semaphore::Red,
    };

    ContractAudit {
        contract_amount,
        real_payment: real_payment_ars,
        deviation,
        deviation_percent,
        color,
    }
}

// ============================================================================
// WHAT-IF: RENT REDUCTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RentReduction {
    pub new_fixed_costs: f64,
    /// Percentage units
    pub new_incidence: f64,
    pub new_margin: f64,
    pub margin_improvement: f64,
}

/// Effect of cutting fixed costs by `reduction_pct` percent
pub fn simulate_rent_reduction(fixed_costs: f64, total_sales: f64, variable_costs: f64, reduction_pct: f64) -> RentReduction {
    let new_fixed_costs = fixed_costs * (1.0 - reduction_pct / 100.0);
    let new_incidence = if total_sales > 0.0 {
        new_fixed_costs / total_sales * 100.0
    } else {
        0.0
    };
    let original_margin = total_sales - fixed_costs - variable_costs;
    let new_margin = total_sales - new_fixed_costs - variable_costs;

    RentReduction {
        new_fixed_costs,
        new_incidence,
        new_margin,
        margin_improvement: new_margin - original_margin,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Module colors with a clean (green) contract audit
    fn colors(performance: Semaphore, benchmark: Semaphore, efficiency: Semaphore) -> VenueColors {
        VenueColors {
            performance,
            benchmark,
            efficiency,
            audit: Semaphore::Green,
        }
    }

    #[test]
    fn test_all_green_is_efficient() {
        let s = global_status(
            &colors(Semaphore::Green, Semaphore::Green, Semaphore::Green),
            &StrategicWeights::default(),
        );
        assert_relative_eq!(s.score, 10.0);
        assert_eq!(s.label, StatusLabel::Efficient);
        assert_eq!(s.color, Semaphore::Green);
    }

    #[test]
    fn test_all_red_modules_lifted_by_clean_audit() {
        // (2*40 + 2*25 + 2*20 + 10*15) / 100 = 3.2
        let s = global_status(
            &colors(Semaphore::Red, Semaphore::Red, Semaphore::Red),
            &StrategicWeights::default(),
        );
        assert_relative_eq!(s.score, 3.2);
        assert_eq!(s.label, StatusLabel::Renegotiate);
        assert_eq!(s.color, Semaphore::Red);
    }

    #[test]
    fn test_mixed_is_watch() {
        // (10*40 + 2*25 + 5*20 + 10*15) / 100 = 7.0
        let s = global_status(
            &colors(Semaphore::Green, Semaphore::Red, Semaphore::Gray),
            &StrategicWeights::default(),
        );
        assert_relative_eq!(s.score, 7.0);
        assert_eq!(s.label, StatusLabel::Watch);
    }

    #[test]
    fn test_critical_is_urgent() {
        // (0*40 + 2*25 + 2*20 + 10*15) / 100 = 2.4
        let s = global_status(
            &colors(Semaphore::Critical, Semaphore::Red, Semaphore::Red),
            &StrategicWeights::default(),
        );
        assert_relative_eq!(s.score, 2.4);
        assert_eq!(s.label, StatusLabel::UrgentAction);
        assert_eq!(s.color, Semaphore::Red);
    }

    #[test]
    fn test_audit_weight_moves_the_score() {
        let mut venue = colors(Semaphore::Green, Semaphore::Green, Semaphore::Green);
        venue.audit = Semaphore::Red;
        // (10*85 + 2*15) / 100 = 8.8
        let s = global_status(&venue, &StrategicWeights::default());
        assert_relative_eq!(s.score, 8.8);
        assert_eq!(s.label, StatusLabel::Efficient);

        let ignore_audit = StrategicWeights {
            audit: 0.0,
            ..StrategicWeights::default()
        };
        assert_relative_eq!(global_status(&venue, &ignore_audit).score, 10.0);
    }

    #[test]
    fn test_zero_weights() {
        let weights = StrategicWeights {
            performance: 0.0,
            benchmarking: 0.0,
            efficiency: 0.0,
            audit: 0.0,
        };
        let s = global_status(&colors(Semaphore::Green, Semaphore::Green, Semaphore::Green), &weights);
        assert_eq!(s.label, StatusLabel::Unweighted);
        assert_eq!(s.color, Semaphore::Yellow);
    }

    #[test]
    fn test_contract_deviation_bands() {
        // 1,000 USD at 1,470 = 1,470,000 ARS agreed
        let on_contract = contract_deviation(1000.0, 1_500_000.0, DEFAULT_USD_ARS_RATE);
        assert_relative_eq!(on_contract.contract_amount, 1_470_000.0);
        assert_relative_eq!(on_contract.deviation, 30_000.0);
        assert_eq!(on_contract.color, Semaphore::Green);

        let drifting = contract_deviation(1000.0, 1_617_000.0, DEFAULT_USD_ARS_RATE);
        assert_relative_eq!(drifting.deviation_percent, 10.0);
        assert_eq!(drifting.color, Semaphore::Yellow);

        let underpaid = contract_deviation(1000.0, 1_000_000.0, DEFAULT_USD_ARS_RATE);
        assert!(underpaid.deviation_percent < -15.0);
        assert_eq!(underpaid.color, Semaphore::Red);
    }

    #[test]
    fn test_contract_without_amount() {
        let audit = contract_deviation(0.0, 500_000.0, DEFAULT_USD_ARS_RATE);
        assert_eq!(audit.deviation_percent, 0.0);
        assert_eq!(audit.color, Semaphore::Green);
    }

    #[test]
    fn test_reconciled_audit_is_green() {
        let audit = ContractAudit::reconciled(2_000_000.0);
        assert_eq!(audit.contract_amount, 2_000_000.0);
        assert_eq!(audit.real_payment, 2_000_000.0);
        assert_eq!(audit.deviation_percent, 0.0);
        assert_eq!(audit.color, Semaphore::Green);
    }

    #[test]
    fn test_rent_reduction() {
        let r = simulate_rent_reduction(2_000_000.0, 10_000_000.0, 3_000_000.0, 25.0);
        assert_relative_eq!(r.new_fixed_costs, 1_500_000.0);
        assert_relative_eq!(r.new_incidence, 15.0);
        assert_relative_eq!(r.new_margin, 5_500_000.0);
        assert_relative_eq!(r.margin_improvement, 500_000.0);

        let r = simulate_rent_reduction(2_000_000.0, 0.0, 0.0, 10.0);
        assert_eq!(r.new_incidence, 0.0);
    }
}
