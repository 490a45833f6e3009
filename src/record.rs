// 🏛️ Venue Records - loosely typed input rows and the typed record the engine mutates

use crate::normalize::{normalize, RawValue};
use crate::quality::QualityIssue;
use crate::semaphore::{EfficiencyClass, PerformanceClass};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// FIELDS
// ============================================================================

/// Canonical input fields
///
/// Each field has one canonical name plus the column names used by the
/// production workbook. Defaults for absent values:
///
/// | field                         | default                         |
/// |-------------------------------|---------------------------------|
/// | `id`                          | 1-based input position          |
/// | `name`                        | `"Salon {id}"`                  |
/// | `year`                        | configured reporting year       |
/// | `status`                      | ACTIVE                          |
/// | address / postal code / muni. | absent                          |
/// | latitude / longitude          | absent (0 is treated as absent) |
/// | every numeric field           | 0                               |
/// | `priority_tier`               | resolved by the tier lookup     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Name,
    Year,
    Status,
    Address,
    PostalCode,
    Municipality,
    Latitude,
    Longitude,
    AreaM2,
    Capacity,
    EventCount,
    GuestCount,
    ActiveMonths,
    VariableCosts,
    FixedCosts,
    TotalSales,
    MarketMedianRentPerM2,
    PriorityTier,
}

impl Field {
    pub const ALL: [Field; 19] = [
        Field::Id,
        Field::Name,
        Field::Year,
        Field::Status,
        Field::Address,
        Field::PostalCode,
        Field::Municipality,
        Field::Latitude,
        Field::Longitude,
        Field::AreaM2,
        Field::Capacity,
        Field::EventCount,
        Field::GuestCount,
        Field::ActiveMonths,
        Field::VariableCosts,
        Field::FixedCosts,
        Field::TotalSales,
        Field::MarketMedianRentPerM2,
        Field::PriorityTier,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::Year => "year",
            Field::Status => "status",
            Field::Address => "address",
            Field::PostalCode => "postal_code",
            Field::Municipality => "municipality",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
            Field::AreaM2 => "area_m2",
            Field::Capacity => "capacity",
            Field::EventCount => "event_count",
            Field::GuestCount => "guest_count",
            Field::ActiveMonths => "active_months",
            Field::VariableCosts => "variable_costs",
            Field::FixedCosts => "fixed_costs",
            Field::TotalSales => "total_sales",
            Field::MarketMedianRentPerM2 => "market_median_rent_per_m2",
            Field::PriorityTier => "priority_tier",
        }
    }

    /// Workbook column names, in lookup order after the canonical name
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Id => &["id_salon"],
            Field::Name => &["nombre_salon"],
            Field::Year => &["año", "ano"],
            Field::Status => &["estado_salon"],
            Field::Address => &["direccion_salon"],
            Field::PostalCode => &["cp_salon"],
            Field::Municipality => &["municipio_salon"],
            Field::Latitude => &["lat_salon"],
            Field::Longitude => &["lon_salon"],
            Field::AreaM2 => &["mt2_salon"],
            Field::Capacity => &["pax_calculado"],
            Field::EventCount => &["cantidad_eventos_salon"],
            Field::GuestCount => &["total_invitados_salon"],
            Field::ActiveMonths => &["meses_activos", "meses_activo"],
            Field::VariableCosts => &["costos_variables_salon"],
            Field::FixedCosts => &["costos_fijos_salon"],
            Field::TotalSales => &["ventas_totales_salon"],
            Field::MarketMedianRentPerM2 => &["mediana_benchmarking_mt", "mt2_mercado"],
            Field::PriorityTier => &["tier_salon", "tier"],
        }
    }

    /// Numeric fields that go through the normalizer
    fn is_numeric(&self) -> bool {
        matches!(
            self,
            Field::AreaM2
                | Field::Capacity
                | Field::EventCount
                | Field::GuestCount
                | Field::ActiveMonths
                | Field::VariableCosts
                | Field::FixedCosts
                | Field::TotalSales
                | Field::MarketMedianRentPerM2
        )
    }
}

// ============================================================================
// RAW RECORD
// ============================================================================

/// RawRecord - one input row keyed by (normalized) column name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    values: HashMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set a column (key is normalized like a sheet header)
    pub fn with(mut self, key: &str, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<RawValue>) {
        self.values.insert(normalize_header(key), value.into());
    }

    /// Value for a canonical field: canonical name first, then aliases
    pub fn get(&self, field: Field) -> &RawValue {
        std::iter::once(field.name())
            .chain(field.aliases().iter().copied())
            .filter_map(|key| self.values.get(key))
            .find(|value| !value.is_missing())
            .unwrap_or(&RawValue::Missing)
    }

    pub fn number(&self, field: Field) -> f64 {
        normalize(self.get(field))
    }

    pub fn text(&self, field: Field) -> Option<String> {
        self.get(field).as_text()
    }

    pub fn has(&self, field: Field) -> bool {
        !self.get(field).is_missing()
    }
}

impl FromIterator<(String, RawValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, RawValue)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (key, value) in iter {
            record.insert(&key, value);
        }
        record
    }
}

/// Sheet header → lookup key: trimmed, lowercase, spaces as underscores
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

// ============================================================================
// STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VenueStatus {
    Active,
    Returned,
    UnderConstruction,
}

impl VenueStatus {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return VenueStatus::Active;
        };
        let upper = raw.trim().to_uppercase();

        if upper == "INACTIVO" || upper.starts_with("DEVUELTO") || upper == "RETURNED" {
            VenueStatus::Returned
        } else if upper.contains("OBRA") || upper.contains("CONSTRUCTION") {
            VenueStatus::UnderConstruction
        } else {
            VenueStatus::Active
        }
    }
}

// ============================================================================
// DERIVED METRIC GROUPS
// ============================================================================

/// Profitability module output. All numbers are finite; zero when the venue
/// was not eligible or a ratio had a zero divisor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profitability {
    pub assessed: bool,
    pub revenue_per_event: f64,
    pub revenue_per_guest: f64,
    pub monthly_revenue: f64,
    pub rent_multiplier: f64,
    /// Fraction (0.15 = 15%)
    pub rent_incidence: f64,
    pub margin: f64,
    /// Fraction of the company-wide margin
    pub margin_share: f64,
    pub total_costs: f64,
    pub profitability_ratio: f64,
    pub score: f64,
    pub classification: Option<PerformanceClass>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub assessed: bool,
    pub rent_per_m2: f64,
    /// Signed fraction; negative = cheaper than market
    pub market_deviation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Efficiency {
    pub assessed: bool,
    pub rent_per_capacity: f64,
    pub median_rent_per_capacity: f64,
    pub median_rent_per_m2: f64,
    pub deviation_index: f64,
    pub classification: Option<EfficiencyClass>,
}

// ============================================================================
// VENUE RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueRecord {
    // Identity
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub status: VenueStatus,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub municipality: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    // Physical / operational
    pub area_m2: f64,
    pub capacity: f64,
    pub event_count: u64,
    pub guest_count: u64,
    pub active_months: u32,

    // Financial inputs
    pub variable_costs: f64,
    pub fixed_costs: f64,
    pub total_sales: f64,

    // Market reference (0 = unknown)
    pub market_median_rent_per_m2: f64,

    /// Tier text as supplied upstream, before resolution
    #[serde(skip)]
    pub supplied_tier: Option<String>,

    /// 1 (top) ..= 5; 0 until the tier assigner runs
    pub priority_tier: u8,

    // Derived
    pub profitability: Profitability,
    pub benchmark: Benchmark,
    pub efficiency: Efficiency,
}

impl VenueRecord {
    /// Build a typed record from a raw row, normalizing every field
    ///
    /// `position` is the 0-based input position (used when there is no id).
    /// Returns the quality issues found while normalizing.
    pub fn from_raw(raw: &RawRecord, position: usize, reporting_year: i32) -> (Self, Vec<QualityIssue>) {
        let id = if raw.has(Field::Id) {
            raw.number(Field::Id).trunc() as i64
        } else {
            position as i64 + 1
        };

        let issues: Vec<QualityIssue> = Field::ALL
            .iter()
            .filter(|f| f.is_numeric())
            .filter_map(|f| QualityIssue::from_cell(id, f.name(), raw.get(*f)))
            .collect();

        let year = if raw.has(Field::Year) {
            match raw.number(Field::Year) {
                y if y >= 1.0 => y.trunc() as i32,
                _ => reporting_year,
            }
        } else {
            reporting_year
        };

        let record = VenueRecord {
            id,
            name: raw.text(Field::Name).unwrap_or_else(|| format!("Salon {}", id)),
            year,
            status: VenueStatus::parse(raw.text(Field::Status).as_deref()),
            address: raw.text(Field::Address),
            postal_code: raw.text(Field::PostalCode),
            municipality: raw.text(Field::Municipality),
            latitude: coordinate(raw.get(Field::Latitude)),
            longitude: coordinate(raw.get(Field::Longitude)),
            area_m2: raw.number(Field::AreaM2),
            capacity: raw.number(Field::Capacity),
            event_count: count(raw.number(Field::EventCount)),
            guest_count: count(raw.number(Field::GuestCount)),
            active_months: count(raw.number(Field::ActiveMonths)).min(u32::MAX as u64) as u32,
            variable_costs: raw.number(Field::VariableCosts),
            fixed_costs: raw.number(Field::FixedCosts),
            total_sales: raw.number(Field::TotalSales),
            market_median_rent_per_m2: raw.number(Field::MarketMedianRentPerM2),
            supplied_tier: raw.text(Field::PriorityTier),
            priority_tier: 0,
            profitability: Profitability::default(),
            benchmark: Benchmark::default(),
            efficiency: Efficiency::default(),
        };

        (record, issues)
    }
}

/// Absent and exact-zero coordinates both mean "not geocoded"
fn coordinate(value: &RawValue) -> Option<f64> {
    if value.is_missing() {
        return None;
    }
    match normalize(value) {
        v if v == 0.0 => None,
        v => Some(v),
    }
}

/// Counts are whole and non-negative
fn count(value: f64) -> u64 {
    value.max(0.0).trunc() as u64
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_prefers_canonical_then_alias() {
        let raw = RawRecord::new()
            .with("Costos Fijos Salon", "$ 2,000.00")
            .with("meses_activo", 10.0);

        assert_eq!(raw.number(Field::FixedCosts), 2000.0);
        assert_eq!(raw.number(Field::ActiveMonths), 10.0);

        let raw = raw.with("active_months", 12.0);
        assert_eq!(raw.number(Field::ActiveMonths), 12.0);
    }

    #[test]
    fn test_blank_canonical_falls_through_to_alias() {
        let raw = RawRecord::new()
            .with("mediana_benchmarking_mt", "")
            .with("mt2_mercado", 9000.0);
        assert_eq!(raw.number(Field::MarketMedianRentPerM2), 9000.0);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(VenueStatus::parse(Some("activo")), VenueStatus::Active);
        assert_eq!(VenueStatus::parse(Some("INACTIVO")), VenueStatus::Returned);
        assert_eq!(VenueStatus::parse(Some("Devueltos")), VenueStatus::Returned);
        assert_eq!(VenueStatus::parse(Some("En obra")), VenueStatus::UnderConstruction);
        assert_eq!(VenueStatus::parse(None), VenueStatus::Active);
    }

    #[test]
    fn test_from_raw_defaults() {
        let (record, issues) = VenueRecord::from_raw(&RawRecord::new(), 4, 2025);

        assert_eq!(record.id, 5);
        assert_eq!(record.name, "Salon 5");
        assert_eq!(record.year, 2025);
        assert_eq!(record.status, VenueStatus::Active);
        assert_eq!(record.latitude, None);
        assert_eq!(record.active_months, 0);
        assert_eq!(record.priority_tier, 0);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_from_raw_workbook_columns() {
        let raw = RawRecord::new()
            .with("id_salon", 12.0)
            .with("nombre_salon", "Palermo Soho")
            .with("año", 2024.0)
            .with("cp_salon", 1425.0)
            .with("lat_salon", 0.0)
            .with("lon_salon", "-58,43")
            .with("cantidad_eventos_salon", "24")
            .with("ventas_totales_salon", "$120,000,000.00")
            .with("costos_fijos_salon", "sin dato")
            .with("tier_salon", "Tier 2");

        let (record, issues) = VenueRecord::from_raw(&raw, 0, 2025);

        assert_eq!(record.id, 12);
        assert_eq!(record.name, "Palermo Soho");
        assert_eq!(record.year, 2024);
        assert_eq!(record.postal_code.as_deref(), Some("1425"));
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, Some(-58.43));
        assert_eq!(record.event_count, 24);
        assert_eq!(record.total_sales, 120_000_000.0);
        assert_eq!(record.fixed_costs, 0.0);
        assert_eq!(record.supplied_tier.as_deref(), Some("Tier 2"));

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "fixed_costs");
        assert_eq!(issues[0].record_id, 12);
    }

    #[test]
    fn test_counts_never_negative() {
        let raw = RawRecord::new().with("guest_count", -30.0).with("event_count", 2.9);
        let (record, _) = VenueRecord::from_raw(&raw, 0, 2025);
        assert_eq!(record.guest_count, 0);
        assert_eq!(record.event_count, 2);
    }

    #[test]
    fn test_raw_record_from_json() {
        let raw: RawRecord =
            serde_json::from_str(r#"{ "id": 3, "name": "Hudson", "fixed_costs": "1234,5", "address": null }"#).unwrap();
        assert_eq!(raw.number(Field::Id), 3.0);
        assert_eq!(raw.text(Field::Name).as_deref(), Some("Hudson"));
        assert_eq!(raw.number(Field::FixedCosts), 1234.5);
        assert_eq!(raw.text(Field::Address), None);
    }
}
