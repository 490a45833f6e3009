// ✂️ Record Partitioner - excluded vs processable venues

use crate::record::VenueRecord;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// Denylisted venues, in denylist order
    pub excluded: Vec<VenueRecord>,
    /// Everything else, in input order, with `active_months` zero-guarded
    pub processable: Vec<VenueRecord>,
}

impl Partition {
    /// Recombine for output: processable first, then excluded
    pub fn recombine(self) -> Vec<VenueRecord> {
        let mut all = self.processable;
        all.extend(self.excluded);
        all
    }

    pub fn len(&self) -> usize {
        self.excluded.len() + self.processable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split records by the id denylist
///
/// Excluded records are ordered by their position in `excluded_ids`;
/// processable records keep input order and get `active_months` 0 → 1.
pub fn partition(records: Vec<VenueRecord>, excluded_ids: &[i64]) -> Partition {
    let rank: HashMap<i64, usize> = excluded_ids
        .iter()
        .enumerate()
        .map(|(position, id)| (*id, position))
        .collect();

    let (mut excluded, mut processable): (Vec<_>, Vec<_>) =
        records.into_iter().partition(|r| rank.contains_key(&r.id));

    // Stable: records sharing a denylist slot keep input order
    excluded.sort_by_key(|r| rank.get(&r.id).copied().unwrap_or(usize::MAX));

    for record in &mut processable {
        if record.active_months == 0 {
            record.active_months = 1;
        }
    }

    Partition {
        excluded,
        processable,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;

    fn venue(id: i64, months: f64) -> VenueRecord {
        let raw = RawRecord::new().with("id", id as f64).with("active_months", months);
        VenueRecord::from_raw(&raw, 0, 2025).0
    }

    fn ids(records: &[VenueRecord]) -> Vec<i64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_excluded_follow_denylist_order() {
        let records = vec![venue(1, 12.0), venue(7, 12.0), venue(3, 12.0), venue(82, 12.0), venue(5, 12.0)];
        let parts = partition(records, &[82, 102, 7]);

        assert_eq!(ids(&parts.excluded), vec![82, 7]);
        assert_eq!(ids(&parts.processable), vec![1, 3, 5]);
    }

    #[test]
    fn test_is_set_partition() {
        let records: Vec<VenueRecord> = (1..=10).map(|id| venue(id, 6.0)).collect();
        let parts = partition(records, &[9, 2, 4, 99]);

        assert_eq!(parts.len(), 10);
        let mut all = ids(&parts.excluded);
        all.extend(ids(&parts.processable));
        all.sort_unstable();
        assert_eq!(all, (1..=10).collect::<Vec<_>>());
        assert!(parts.excluded.iter().all(|r| !parts.processable.iter().any(|p| p.id == r.id)));
    }

    #[test]
    fn test_zero_guard_only_on_processable() {
        let parts = partition(vec![venue(1, 0.0), venue(2, 0.0), venue(3, 4.0)], &[2]);

        assert_eq!(parts.processable[0].active_months, 1);
        assert_eq!(parts.processable[1].active_months, 4);
        assert_eq!(parts.excluded[0].active_months, 0);
    }

    #[test]
    fn test_recombine_processable_then_excluded() {
        let parts = partition(vec![venue(5, 1.0), venue(7, 1.0), venue(6, 1.0)], &[7]);
        assert_eq!(ids(&parts.recombine()), vec![5, 6, 7]);
    }

    #[test]
    fn test_empty_input() {
        let parts = partition(Vec::new(), &[1, 2]);
        assert!(parts.is_empty());
    }
}
