// Venue Scoring Engine - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod normalize;     // Numeric normalizer for spreadsheet cells
pub mod error;
pub mod config;        // Denylist, tier table, weights
pub mod stats;         // Percentile / median / interpolation
pub mod semaphore;     // Colors and performance / efficiency classes
pub mod quality;       // Input quality log
pub mod record;
pub mod tiers;         // Priority tier assignment
pub mod partition;     // Excluded vs processable
pub mod profitability; // Module 1: profitability score
pub mod benchmarking;  // Module 2: rent per m² vs market
pub mod efficiency;    // Module 3: tier-peer deviation index
pub mod status;        // Global status, contract audit, what-if
pub mod output;
pub mod engine;
pub mod loader;

// Re-export commonly used types
pub use config::{EngineConfig, StrategicWeights, TierKeyword};
pub use engine::{RunReport, ScoringEngine, ScoringRun};
pub use error::ConfigError;
pub use loader::{load_csv, load_json, load_records, read_json_records, read_records, write_json};
pub use normalize::{normalize, RawValue};
pub use output::{VenueColors, VenueOutput};
pub use quality::{QualityIssue, QualityLog, Severity};
pub use record::{Field, RawRecord, VenueRecord, VenueStatus};
pub use semaphore::{EfficiencyClass, PerformanceClass, Semaphore};
pub use status::{
    contract_deviation, global_status, simulate_rent_reduction, ContractAudit, GlobalStatus, RentReduction,
    StatusLabel, DEFAULT_USD_ARS_RATE,
};
pub use tiers::{TierAssigner, TierAssignment, TierSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
