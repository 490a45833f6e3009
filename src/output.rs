// 📤 Output records - the enriched shape handed to the display layer
// Every number here is finite; undefined metrics were zero-filled upstream.

use crate::record::{VenueRecord, VenueStatus};
use crate::semaphore::{PerformanceClass, Semaphore};
use crate::status::ContractAudit;
use serde::{Deserialize, Serialize};

/// The four semaphores of a venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueColors {
    pub performance: Semaphore,
    pub benchmark: Semaphore,
    pub efficiency: Semaphore,
    pub audit: Semaphore,
}

impl VenueColors {
    pub fn of(record: &VenueRecord) -> Self {
        VenueColors {
            performance: match record.profitability.classification {
                Some(class) => class.semaphore(),
                None => Semaphore::from_status(None),
            },
            benchmark: Semaphore::from_market_deviation(record.benchmark.market_deviation),
            efficiency: Semaphore::from_efficiency_index(record.efficiency.deviation_index),
            audit: ContractAudit::reconciled(record.fixed_costs).color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceOutput {
    pub rent_incidence: f64,
    pub multiplier: f64,
    pub margin_contribution: f64,
    pub score: f64,
    pub color: Semaphore,
    pub classification: Option<PerformanceClass>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkOutput {
    pub rent_per_mt2: f64,
    pub market_mt2: f64,
    pub market_deviation: f64,
    pub market_cost_per_mt2: f64,
    /// Percentage units
    pub deviation: f64,
    pub color: Semaphore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EfficiencyOutput {
    pub rent_per_pax: f64,
    pub pax_ratio: f64,
    pub mt2_ratio: f64,
    pub median_pax_tier: f64,
    pub global_index: f64,
    /// Percentage points above/below the tier median (0 when not indexed)
    pub median_deviation: f64,
    pub color: Semaphore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAuditOutput {
    pub contract_amount: f64,
    pub real_payment: f64,
    pub deviation_percent: f64,
    pub color: Semaphore,
}

impl From<ContractAudit> for ContractAuditOutput {
    fn from(audit: ContractAudit) -> Self {
        Self {
            contract_amount: audit.contract_amount,
            real_payment: audit.real_payment,
            deviation_percent: audit.deviation_percent,
            color: audit.color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraOutput {
    pub meses_activos: f64,
    pub ticket_evento: f64,
    pub ticket_persona: f64,
    pub venta_mensual: f64,
}

/// VenueOutput - one enriched record as serialized for consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueOutput {
    pub id: i64,
    pub year: i32,
    pub name: String,
    pub status: VenueStatus,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub municipality: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity: f64,
    pub area_m2: f64,
    pub event_count: u64,
    pub guest_count: u64,
    pub active_months: u32,
    pub variable_costs: f64,
    pub fixed_costs: f64,
    pub total_costs: f64,
    pub total_sales: f64,
    pub margin: f64,
    pub profitability_ratio: f64,
    pub market_median_rent_per_m2: f64,
    pub priority_tier: u8,

    pub performance: PerformanceOutput,
    pub benchmark: BenchmarkOutput,
    pub efficiency: EfficiencyOutput,
    #[serde(rename = "contractAudit")]
    pub contract_audit: ContractAuditOutput,
    pub extra: ExtraOutput,
}

impl From<&VenueRecord> for VenueOutput {
    fn from(record: &VenueRecord) -> Self {
        let colors = VenueColors::of(record);
        let p = &record.profitability;
        let b = &record.benchmark;
        let e = &record.efficiency;

        let ratio = |value: f64, median: f64| if median > 0.0 { value / median } else { 0.0 };
        let median_deviation = if e.deviation_index > 0.0 {
            (e.deviation_index - 1.0) * 100.0
        } else {
            0.0
        };

        VenueOutput {
            id: record.id,
            year: record.year,
            name: record.name.clone(),
            status: record.status,
            address: record.address.clone(),
            postal_code: record.postal_code.clone(),
            municipality: record.municipality.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            capacity: record.capacity,
            area_m2: record.area_m2,
            event_count: record.event_count,
            guest_count: record.guest_count,
            active_months: record.active_months,
            variable_costs: record.variable_costs,
            fixed_costs: record.fixed_costs,
            total_costs: p.total_costs,
            total_sales: record.total_sales,
            margin: p.margin,
            profitability_ratio: p.profitability_ratio,
            market_median_rent_per_m2: record.market_median_rent_per_m2,
            priority_tier: record.priority_tier,

            performance: PerformanceOutput {
                rent_incidence: p.rent_incidence,
                multiplier: p.rent_multiplier,
                margin_contribution: p.margin_share,
                score: p.score,
                color: colors.performance,
                classification: p.classification,
            },
            benchmark: BenchmarkOutput {
                rent_per_mt2: b.rent_per_m2,
                market_mt2: record.market_median_rent_per_m2,
                market_deviation: b.market_deviation,
                market_cost_per_mt2: record.market_median_rent_per_m2,
                deviation: b.market_deviation * 100.0,
                color: colors.benchmark,
            },
            efficiency: EfficiencyOutput {
                rent_per_pax: e.rent_per_capacity,
                pax_ratio: ratio(e.rent_per_capacity, e.median_rent_per_capacity),
                mt2_ratio: ratio(b.rent_per_m2, e.median_rent_per_m2),
                median_pax_tier: e.median_rent_per_capacity,
                global_index: e.deviation_index,
                median_deviation,
                color: colors.efficiency,
            },
            contract_audit: ContractAudit::reconciled(record.fixed_costs).into(),
            extra: ExtraOutput {
                meses_activos: record.active_months as f64,
                ticket_evento: p.revenue_per_event,
                ticket_persona: p.revenue_per_guest,
                venta_mensual: p.monthly_revenue,
            },
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
