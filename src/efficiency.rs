// 🧮 Efficiency Module - rent per capacity and per m² against tier peers
//
// Collect → aggregate → score:
//   1. rent per capacity for every eligible venue
//   2. per-tier medians of rent per capacity and rent per m²
//   3. deviation index against those medians

use crate::normalize::{finite_or_zero, safe_div};
use crate::record::{Efficiency, VenueRecord};
use crate::semaphore::EfficiencyClass;
use crate::stats::median;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Peer medians for one tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TierMedians {
    pub rent_per_capacity: f64,
    pub rent_per_m2: f64,
}

impl TierMedians {
    fn usable(&self) -> bool {
        self.rent_per_capacity > 0.0 && self.rent_per_m2 > 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EfficiencySummary {
    pub eligible: usize,
    /// Venues that got a deviation index
    pub indexed: usize,
    pub tier_medians: BTreeMap<u8, TierMedians>,
}

pub fn is_eligible(record: &VenueRecord) -> bool {
    record.capacity > 0.0 && record.area_m2 > 0.0 && record.fixed_costs > 0.0
}

/// Mean of the two peer ratios; 1.0 means exactly at the tier median
pub fn deviation_index(rent_per_capacity: f64, rent_per_m2: f64, medians: &TierMedians) -> Option<f64> {
    let capacity_ratio = safe_div(rent_per_capacity, medians.rent_per_capacity)?;
    let area_ratio = safe_div(rent_per_m2, medians.rent_per_m2)?;
    Some((capacity_ratio + area_ratio) / 2.0)
}

/// Run the module over the processable set. Needs benchmarking to have run
/// first: rent per m² is taken from `record.benchmark` when it was assessed.
pub fn apply(records: &mut [VenueRecord]) -> EfficiencySummary {
    // 1. Collect
    let eligible: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| is_eligible(r))
        .map(|(i, _)| i)
        .collect();

    let rent_per_capacity: Vec<Option<f64>> = eligible
        .iter()
        .map(|&i| safe_div(records[i].fixed_costs, records[i].capacity))
        .collect();

    // 2. Aggregate by tier
    let mut capacity_by_tier: BTreeMap<u8, Vec<f64>> = BTreeMap::new();
    let mut area_by_tier: BTreeMap<u8, Vec<f64>> = BTreeMap::new();
    for (slot, &i) in eligible.iter().enumerate() {
        let record = &records[i];
        let tier = record.priority_tier;
        capacity_by_tier.entry(tier).or_default();
        area_by_tier.entry(tier).or_default();

        if let Some(value) = rent_per_capacity[slot] {
            capacity_by_tier.entry(tier).or_default().push(value);
        }
        if let Some(value) = rent_per_m2(record) {
            area_by_tier.entry(tier).or_default().push(value);
        }
    }

    let tier_medians: BTreeMap<u8, TierMedians> = capacity_by_tier
        .iter()
        .map(|(tier, capacity)| {
            let area = area_by_tier.get(tier).map(Vec::as_slice).unwrap_or(&[]);
            let medians = TierMedians {
                rent_per_capacity: median(capacity).unwrap_or(0.0),
                rent_per_m2: median(area).unwrap_or(0.0),
            };
            (*tier, medians)
        })
        .collect();

    for (tier, medians) in &tier_medians {
        debug!(
            tier,
            median_rent_per_capacity = medians.rent_per_capacity,
            median_rent_per_m2 = medians.rent_per_m2,
            "efficiency tier medians"
        );
    }

    // 3. Score
    let mut indexed = 0;
    for (slot, &i) in eligible.iter().enumerate() {
        let record = &mut records[i];
        let medians = tier_medians.get(&record.priority_tier).copied().unwrap_or_default();
        let per_capacity = rent_per_capacity[slot];

        let index = if medians.usable() {
            match (per_capacity, rent_per_m2(record)) {
                (Some(capacity), Some(area)) => deviation_index(capacity, area, &medians).map(finite_or_zero),
                _ => None,
            }
        } else {
            None
        };

        if index.is_some() {
            indexed += 1;
        }

        record.efficiency = Efficiency {
            assessed: true,
            rent_per_capacity: per_capacity.map(finite_or_zero).unwrap_or(0.0),
            median_rent_per_capacity: finite_or_zero(medians.rent_per_capacity),
            median_rent_per_m2: finite_or_zero(medians.rent_per_m2),
            deviation_index: index.unwrap_or(0.0),
            classification: index.map(EfficiencyClass::from_index),
        };
    }

    EfficiencySummary {
        eligible: eligible.len(),
        indexed,
        tier_medians,
    }
}

fn rent_per_m2(record: &VenueRecord) -> Option<f64> {
    if record.benchmark.assessed {
        Some(record.benchmark.rent_per_m2)
    } else {
        None
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmarking;
    use crate::record::RawRecord;
    use crate::semaphore::Semaphore;
    use approx::assert_relative_eq;

    fn venue(id: i64, capacity: f64, area: f64, fixed: f64, tier: u8) -> VenueRecord {
        let raw = RawRecord::new()
            .with("id", id as f64)
            .with("capacity", capacity)
            .with("area_m2", area)
            .with("fixed_costs", fixed)
            .with("market_median_rent_per_m2", 9000.0);
        let mut record = VenueRecord::from_raw(&raw, 0, 2025).0;
        record.priority_tier = tier;
        record
    }

    fn run(records: &mut [VenueRecord]) -> EfficiencySummary {
        benchmarking::apply(records);
        apply(records)
    }

    #[test]
    fn test_venue_at_both_medians_is_one() {
        let mut records = vec![
            venue(1, 100.0, 200.0, 1_000_000.0, 2),
            venue(2, 100.0, 200.0, 2_000_000.0, 2),
            venue(3, 100.0, 200.0, 3_000_000.0, 2),
        ];
        let summary = run(&mut records);

        let middle = &records[1].efficiency;
        assert_relative_eq!(middle.rent_per_capacity, 20_000.0);
        assert_relative_eq!(middle.median_rent_per_capacity, 20_000.0);
        assert_relative_eq!(middle.median_rent_per_m2, 10_000.0);
        assert_relative_eq!(middle.deviation_index, 1.0);
        assert_eq!(middle.classification, Some(EfficiencyClass::Standard));
        assert_eq!(Semaphore::from_efficiency_index(middle.deviation_index), Semaphore::Yellow);

        assert_relative_eq!(records[0].efficiency.deviation_index, 0.5);
        assert_eq!(records[0].efficiency.classification, Some(EfficiencyClass::Favorable));
        assert_relative_eq!(records[2].efficiency.deviation_index, 1.5);
        assert_eq!(records[2].efficiency.classification, Some(EfficiencyClass::Review));

        assert_eq!(summary.eligible, 3);
        assert_eq!(summary.indexed, 3);
    }

    #[test]
    fn test_medians_are_per_tier() {
        let mut records = vec![
            venue(1, 100.0, 100.0, 1_000_000.0, 2),
            venue(2, 100.0, 100.0, 4_000_000.0, 3),
            venue(3, 100.0, 100.0, 6_000_000.0, 3),
        ];
        let summary = run(&mut records);

        assert_relative_eq!(summary.tier_medians[&2].rent_per_capacity, 10_000.0);
        assert_relative_eq!(summary.tier_medians[&3].rent_per_capacity, 50_000.0);
        assert_relative_eq!(records[0].efficiency.deviation_index, 1.0);
        assert_relative_eq!(records[1].efficiency.deviation_index, 0.8);
    }

    #[test]
    fn test_tier_one_has_no_area_median() {
        // Tier 1 skips benchmarking, so there is no rent per m² to compare
        let mut records = vec![venue(1, 100.0, 100.0, 1_000_000.0, 1), venue(2, 100.0, 100.0, 2_000_000.0, 1)];
        let summary = run(&mut records);

        assert_eq!(summary.eligible, 2);
        assert_eq!(summary.indexed, 0);
        let e = &records[0].efficiency;
        assert!(e.assessed);
        assert_relative_eq!(e.rent_per_capacity, 10_000.0);
        assert_relative_eq!(e.median_rent_per_capacity, 15_000.0);
        assert_eq!(e.median_rent_per_m2, 0.0);
        assert_eq!(e.deviation_index, 0.0);
        assert_eq!(e.classification, None);
        assert_eq!(Semaphore::from_efficiency_index(e.deviation_index), Semaphore::Gray);
    }

    #[test]
    fn test_ineligible_untouched() {
        let mut records = vec![venue(1, 0.0, 100.0, 1_000_000.0, 2)];
        let summary = run(&mut records);

        assert_eq!(summary.eligible, 0);
        assert_eq!(records[0].efficiency, Efficiency::default());
    }

    #[test]
    fn test_deviation_index_guards_zero_medians() {
        let medians = TierMedians {
            rent_per_capacity: 0.0,
            rent_per_m2: 10.0,
        };
        assert_eq!(deviation_index(5.0, 5.0, &medians), None);
    }
}
