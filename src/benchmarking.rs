// 🏙️ Benchmarking Module - rent per m² against the market median
// Top-tier venues set their own market and are never compared.

use crate::normalize::{finite_or_zero, safe_div};
use crate::record::{Benchmark, VenueRecord};
use tracing::debug;

pub fn is_eligible(record: &VenueRecord) -> bool {
    record.area_m2 > 0.0
        && record.fixed_costs > 0.0
        && record.market_median_rent_per_m2.is_finite()
        && record.market_median_rent_per_m2 > 0.0
        && record.priority_tier != 1
}

/// Signed deviation from the market median; negative = cheaper than market
pub fn market_deviation(rent_per_m2: f64, market_median: f64) -> Option<f64> {
    safe_div(rent_per_m2 - market_median, market_median)
}

/// Fill `record.benchmark` for every eligible venue; returns the eligible count
pub fn apply(records: &mut [VenueRecord]) -> usize {
    let mut eligible = 0;

    for record in records.iter_mut().filter(|r| is_eligible(r)) {
        let rent_per_m2 = safe_div(record.fixed_costs, record.area_m2);
        let deviation = rent_per_m2.and_then(|rent| market_deviation(rent, record.market_median_rent_per_m2));

        record.benchmark = Benchmark {
            assessed: true,
            rent_per_m2: rent_per_m2.map(finite_or_zero).unwrap_or(0.0),
            market_deviation: deviation.map(finite_or_zero).unwrap_or(0.0),
        };
        eligible += 1;
    }

    debug!(eligible, "benchmarking applied");
    eligible
}

// ============================================================================
// TESTS
// ============================================================================
