// 💰 Profitability Module
// Revenue ratios, margin, margin share and the weighted performance score.
//
// Two passes over the eligible set:
//   1. per-venue ratios and margin
//   2. company-wide aggregates (margin sum, p95 margin target)
// then scoring, which depends on both.

use crate::normalize::{finite_or_zero, safe_div};
use crate::record::{Profitability, VenueRecord};
use crate::semaphore::PerformanceClass;
use crate::stats::{interpolate, percentile};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Incidence (%) domain → points; lower incidence scores higher
const INCIDENCE_DOMAIN: (f64, f64) = (5.0, 30.0);
const INCIDENCE_RANGE: (f64, f64) = (100.0, 0.0);

const PER_EVENT_DOMAIN: (f64, f64) = (10_000_000.0, 40_000_000.0);
const PER_GUEST_DOMAIN: (f64, f64) = (150_000.0, 500_000.0);
const POINTS: (f64, f64) = (0.0, 100.0);

/// Percentile of the margin distribution that earns full margin points
const MARGIN_TARGET_PERCENTILE: f64 = 95.0;

const WEIGHT_MARGIN: f64 = 0.40;
const WEIGHT_INCIDENCE: f64 = 0.30;
const WEIGHT_PER_EVENT: f64 = 0.15;
const WEIGHT_PER_GUEST: f64 = 0.15;

/// Company-wide aggregates from the eligible set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfitabilitySummary {
    pub eligible: usize,
    pub total_margin: f64,
    pub margin_target: f64,
}

/// Sub-scores behind `ip_score`, each 0..=100
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub incidence: f64,
    pub margin: f64,
    pub per_event: f64,
    pub per_guest: f64,
}

impl ScoreBreakdown {
    pub fn weighted(&self) -> f64 {
        WEIGHT_MARGIN * self.margin
            + WEIGHT_INCIDENCE * self.incidence
            + WEIGHT_PER_EVENT * self.per_event
            + WEIGHT_PER_GUEST * self.per_guest
    }
}

/// Per-venue intermediates; `None` marks a ratio whose divisor was zero
#[derive(Debug, Clone, Copy)]
struct Ratios {
    revenue_per_event: Option<f64>,
    revenue_per_guest: Option<f64>,
    monthly_revenue: Option<f64>,
    rent_multiplier: Option<f64>,
    /// Percentage units (15.0 = 15%)
    rent_incidence_pct: Option<f64>,
    margin: f64,
    total_costs: f64,
    profitability_ratio: Option<f64>,
}

pub fn is_eligible(record: &VenueRecord) -> bool {
    record.total_sales.is_finite() && record.total_sales > 0.0 && record.active_months > 0
}

fn ratios(record: &VenueRecord) -> Ratios {
    let sales = record.total_sales;
    let fixed = record.fixed_costs;
    let variable = record.variable_costs;
    let months = record.active_months as f64;

    let monthly_revenue = safe_div(sales, months);
    let total_costs = variable + fixed * months;

    Ratios {
        revenue_per_event: safe_div(sales, record.event_count as f64),
        revenue_per_guest: safe_div(sales, record.guest_count as f64),
        monthly_revenue,
        rent_multiplier: monthly_revenue.and_then(|m| safe_div(m, fixed)),
        rent_incidence_pct: monthly_revenue.and_then(|m| safe_div(fixed, m)).map(|r| r * 100.0),
        margin: sales - variable - fixed * 12.0,
        total_costs,
        profitability_ratio: safe_div(sales - total_costs, sales),
    }
}

/// Score one venue against the company-wide margin target
pub fn score_breakdown(
    rent_incidence_pct: f64,
    margin: f64,
    revenue_per_event: f64,
    revenue_per_guest: f64,
    margin_target: f64,
) -> ScoreBreakdown {
    ScoreBreakdown {
        incidence: interpolate(rent_incidence_pct, INCIDENCE_DOMAIN, INCIDENCE_RANGE),
        margin: interpolate(margin, (0.0, margin_target), POINTS),
        per_event: interpolate(revenue_per_event, PER_EVENT_DOMAIN, POINTS),
        per_guest: interpolate(revenue_per_guest, PER_GUEST_DOMAIN, POINTS),
    }
}

/// Weighted score; a loss-making venue always scores 0
pub fn ip_score(breakdown: &ScoreBreakdown, margin: f64) -> f64 {
    if margin < 0.0 {
        0.0
    } else {
        breakdown.weighted()
    }
}

/// p95 of the eligible margins; 1 when there are none or it is exactly 0
pub fn margin_target(margins: &[f64]) -> f64 {
    match percentile(margins, MARGIN_TARGET_PERCENTILE) {
        Some(target) if target != 0.0 => target,
        _ => 1.0,
    }
}

/// Run the module over the processable set, filling `record.profitability`
pub fn apply(records: &mut [VenueRecord]) -> ProfitabilitySummary {
    // Pass 1: per-venue ratios
    let computed: Vec<(usize, Ratios)> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| is_eligible(r))
        .map(|(i, r)| (i, ratios(r)))
        .collect();

    // Pass 2: aggregates over the complete eligible set
    let margins: Vec<f64> = computed.iter().map(|(_, r)| r.margin).collect();
    let total_margin: f64 = margins.iter().sum();
    let target = margin_target(&margins);

    debug!(
        eligible = computed.len(),
        total_margin, margin_target = target, "profitability aggregates"
    );

    // Scoring
    for (index, r) in computed.iter() {
        let breakdown = score_breakdown(
            r.rent_incidence_pct.unwrap_or(0.0),
            r.margin,
            r.revenue_per_event.unwrap_or(0.0),
            r.revenue_per_guest.unwrap_or(0.0),
            target,
        );
        let score = finite_or_zero(ip_score(&breakdown, r.margin));

        let margin_share = if total_margin > 0.0 {
            r.margin / total_margin
        } else {
            0.0
        };

        records[*index].profitability = Profitability {
            assessed: true,
            revenue_per_event: stored(r.revenue_per_event),
            revenue_per_guest: stored(r.revenue_per_guest),
            monthly_revenue: stored(r.monthly_revenue),
            rent_multiplier: stored(r.rent_multiplier),
            rent_incidence: stored(r.rent_incidence_pct.map(|pct| pct / 100.0)),
            margin: finite_or_zero(r.margin),
            margin_share: finite_or_zero(margin_share),
            total_costs: finite_or_zero(r.total_costs),
            profitability_ratio: stored(r.profitability_ratio),
            score,
            classification: Some(PerformanceClass::from_score(score)),
        };
    }

    ProfitabilitySummary {
        eligible: computed.len(),
        total_margin: finite_or_zero(total_margin),
        margin_target: target,
    }
}

fn stored(value: Option<f64>) -> f64 {
    value.map(finite_or_zero).unwrap_or(0.0)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;
    use approx::assert_relative_eq;

    fn venue(id: i64, sales: f64, variable: f64, fixed: f64, events: f64, guests: f64, months: f64) -> VenueRecord {
        let raw = RawRecord::new()
            .with("id", id as f64)
            .with("total_sales", sales)
            .with("variable_costs", variable)
            .with("fixed_costs", fixed)
            .with("event_count", events)
            .with("guest_count", guests)
            .with("active_months", months);
        VenueRecord::from_raw(&raw, 0, 2025).0
    }

    fn reference_venue() -> VenueRecord {
        venue(1, 120_000_000.0, 30_000_000.0, 2_000_000.0, 24.0, 3000.0, 12.0)
    }

    #[test]
    fn test_reference_ratios() {
        let mut records = vec![reference_venue()];
        let summary = apply(&mut records);
        let p = &records[0].profitability;

        assert!(p.assessed);
        assert_eq!(summary.eligible, 1);
        assert_relative_eq!(p.monthly_revenue, 10_000_000.0);
        assert_relative_eq!(p.rent_multiplier, 5.0);
        assert_relative_eq!(p.margin, 66_000_000.0);
        assert_relative_eq!(p.total_costs, 54_000_000.0);
        assert_relative_eq!(p.profitability_ratio, 0.55);
        assert_relative_eq!(p.revenue_per_event, 5_000_000.0);
        assert_relative_eq!(p.revenue_per_guest, 40_000.0);
        assert_relative_eq!(p.rent_incidence, 0.2);
        assert_relative_eq!(p.margin_share, 1.0);
    }

    #[test]
    fn test_reference_score() {
        let mut records = vec![reference_venue()];
        apply(&mut records);
        let p = &records[0].profitability;

        // Only venue → it is its own p95 → full margin points.
        // Incidence 20% → 40 points; per-event and per-guest below domain → 0.
        assert_relative_eq!(p.score, 0.40 * 100.0 + 0.30 * 40.0);
        assert_eq!(p.classification, Some(PerformanceClass::Medium));
    }

    #[test]
    fn test_ineligible_left_at_default() {
        let mut records = vec![venue(1, 0.0, 10.0, 10.0, 1.0, 1.0, 12.0)];
        let summary = apply(&mut records);

        assert_eq!(summary.eligible, 0);
        assert_eq!(summary.margin_target, 1.0);
        assert_eq!(records[0].profitability, Profitability::default());
    }

    #[test]
    fn test_zero_divisors_store_zero() {
        let mut records = vec![venue(1, 1_000_000.0, 0.0, 0.0, 0.0, 0.0, 1.0)];
        apply(&mut records);
        let p = &records[0].profitability;

        assert_eq!(p.revenue_per_event, 0.0);
        assert_eq!(p.revenue_per_guest, 0.0);
        assert_eq!(p.rent_multiplier, 0.0);
        assert_eq!(p.rent_incidence, 0.0);
        assert!(p.score.is_finite());
    }

    #[test]
    fn test_negative_margin_forces_zero_score() {
        // Cheap rent (full incidence points) but a loss overall
        let mut records = vec![venue(1, 10_000_000.0, 20_000_000.0, 10_000.0, 1.0, 10.0, 12.0)];
        apply(&mut records);
        let p = &records[0].profitability;

        assert!(p.margin < 0.0);
        assert_eq!(p.score, 0.0);
        assert_eq!(p.classification, Some(PerformanceClass::VeryLow));
    }

    #[test]
    fn test_margin_share_sums_to_one() {
        let mut records = vec![
            venue(1, 100_000_000.0, 10_000_000.0, 1_000_000.0, 10.0, 100.0, 12.0),
            venue(2, 50_000_000.0, 5_000_000.0, 1_000_000.0, 10.0, 100.0, 12.0),
            venue(3, 20_000_000.0, 25_000_000.0, 1_000_000.0, 10.0, 100.0, 12.0),
        ];
        let summary = apply(&mut records);

        assert!(summary.total_margin > 0.0);
        let share: f64 = records.iter().map(|r| r.profitability.margin_share).sum();
        assert_relative_eq!(share, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_margin_share_zero_when_total_not_positive() {
        let mut records = vec![
            venue(1, 10_000_000.0, 20_000_000.0, 0.0, 1.0, 1.0, 12.0),
            venue(2, 5_000_000.0, 1_000_000.0, 0.0, 1.0, 1.0, 12.0),
        ];
        let summary = apply(&mut records);

        assert!(summary.total_margin <= 0.0);
        assert!(records.iter().all(|r| r.profitability.margin_share == 0.0));
    }

    #[test]
    fn test_score_monotonic_in_margin() {
        let target = 50_000_000.0;
        let mut previous = f64::MIN;
        for step in 0..=20 {
            let margin = step as f64 * 5_000_000.0;
            let breakdown = score_breakdown(12.0, margin, 20_000_000.0, 200_000.0, target);
            let score = ip_score(&breakdown, margin);
            assert!(score >= previous);
            previous = score;
        }
        assert_eq!(ip_score(&score_breakdown(12.0, -1.0, 20_000_000.0, 200_000.0, target), -1.0), 0.0);
    }

    #[test]
    fn test_per_event_points_clamped() {
        let breakdown = score_breakdown(0.0, 0.0, 100_000_000.0, 0.0, 1.0);
        assert_eq!(breakdown.per_event, 100.0);
        assert_eq!(breakdown.incidence, 100.0);
        assert_eq!(breakdown.per_guest, 0.0);
    }

    #[test]
    fn test_margin_target_fallbacks() {
        assert_eq!(margin_target(&[]), 1.0);
        assert_eq!(margin_target(&[0.0, 0.0]), 1.0);
        assert_relative_eq!(margin_target(&[0.0, 10.0, 20.0, 30.0]), 28.5);
    }
}
