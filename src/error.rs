// Engine configuration errors
//
// Per-record data problems never surface as errors; only a broken denylist or
// tier table does, and it does so at construction time.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("excluded id {0} is listed more than once")]
    DuplicateExcludedId(i64),

    #[error("tier table entry '{keyword}' has tier {tier}, expected 1..=5")]
    TierOutOfRange { keyword: String, tier: u8 },

    #[error("tier table entry #{0} has an empty keyword")]
    EmptyKeyword(usize),

    #[error("tier table keyword '{0}' is listed more than once")]
    DuplicateKeyword(String),

    #[error("strategic weights must be non-negative and finite")]
    InvalidWeights,
}
