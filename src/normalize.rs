// 🧹 Numeric Normalizer
// Turns whatever the spreadsheet hands us into a finite f64

use serde::{Deserialize, Serialize};

// ============================================================================
// RAW VALUE
// ============================================================================

/// RawValue - one loosely typed cell, before normalization
///
/// Deserializes from JSON numbers, strings and `null`, so a JSON export of the
/// sheet can be fed to the engine as-is. Any other JSON shape (bool, array,
/// object) lands in `Other` and normalizes to 0 like any malformed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Missing,
    Other(serde_json::Value),
}

impl RawValue {
    /// Build from a CSV cell: empty (after trim) means missing
    pub fn from_cell(cell: &str) -> Self {
        if cell.trim().is_empty() {
            RawValue::Missing
        } else {
            RawValue::Text(cell.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            RawValue::Missing => true,
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::Number(_) | RawValue::Other(_) => false,
        }
    }

    /// Text form for string-typed fields (name, address, ...)
    ///
    /// Whole numbers are rendered without a trailing `.0` so a postal code
    /// read as a number comes back as "1425", not "1425.0".
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Missing | RawValue::Other(_) => None,
            RawValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            RawValue::Number(n) if !n.is_finite() => None,
            RawValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            RawValue::Number(n) => Some(n.to_string()),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RawValue::Missing)
    }
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Outcome of normalizing one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Parsed cleanly (or was already a finite number)
    Parsed,
    /// Absent or blank
    Missing,
    /// The "$ -" style sentinel used for "nothing" in accounting sheets
    Sentinel,
    /// Present but unusable: garbage text or a non-finite number
    Malformed,
}

/// Normalized value plus how we got there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalized {
    pub value: f64,
    pub outcome: Outcome,
}

impl Normalized {
    fn parsed(value: f64) -> Self {
        Normalized { value, outcome: Outcome::Parsed }
    }

    fn zero(outcome: Outcome) -> Self {
        Normalized { value: 0.0, outcome }
    }
}

/// Normalize a raw cell into a finite number. Never fails; anything
/// unusable becomes 0.
pub fn normalize(value: &RawValue) -> f64 {
    inspect(value).value
}

/// Same as [`normalize`], but also reports whether the input was malformed
pub fn inspect(value: &RawValue) -> Normalized {
    match value {
        RawValue::Missing => Normalized::zero(Outcome::Missing),
        RawValue::Number(n) if n.is_finite() => Normalized::parsed(*n),
        RawValue::Number(_) | RawValue::Other(_) => Normalized::zero(Outcome::Malformed),
        RawValue::Text(s) => normalize_text(s),
    }
}

/// Parse a currency-formatted string
///
/// Separator rules:
/// - both `,` and `.` present: `.` is the decimal point, `,` groups thousands
/// - only `,` present: `,` is the decimal point
fn normalize_text(raw: &str) -> Normalized {
    let s = raw.trim();
    if s.is_empty() {
        return Normalized::zero(Outcome::Missing);
    }
    if s == "-" || s.ends_with('-') {
        return Normalized::zero(Outcome::Sentinel);
    }

    let s = s.replace('$', "");
    let s = s.trim();

    let s = if s.contains(',') && s.contains('.') {
        s.replace(',', "")
    } else if s.contains(',') {
        s.replace(',', ".")
    } else {
        s.to_string()
    };

    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    if cleaned.is_empty() {
        return Normalized::zero(Outcome::Malformed);
    }
    if cleaned == "-" {
        return Normalized::zero(Outcome::Sentinel);
    }

    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => Normalized::parsed(n),
        _ => Normalized::zero(Outcome::Malformed),
    }
}

/// Store-side guard: non-finite results become 0
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Zero-guarded division. A zero (or non-finite) divisor yields `None`,
/// which callers later zero-fill.
pub fn safe_div(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    let result = numerator / denominator;
    if result.is_finite() {
        Some(result)
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

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    #[test]
    fn test_both_separators_dot_is_decimal() {
        assert_eq!(normalize(&text("$1,234.56")), 1234.56);
        assert_eq!(normalize(&text("$ 1,234,567.89")), 1234567.89);
    }

    #[test]
    fn test_comma_only_is_decimal() {
        assert_eq!(normalize(&text("1234,56")), 1234.56);
        assert_eq!(normalize(&text("$ 10,5")), 10.5);
    }

    #[test]
    fn test_plain_numbers() {
        assert_eq!(normalize(&text("  42 ")), 42.0);
        assert_eq!(normalize(&text("-17.5")), -17.5);
        assert_eq!(normalize(&RawValue::Number(3.25)), 3.25);
    }

    #[test]
    fn test_sentinel_dash() {
        assert_eq!(inspect(&text("-")).outcome, Outcome::Sentinel);
        assert_eq!(normalize(&text("$  -")), 0.0);
        assert_eq!(normalize(&text("120 -")), 0.0);
    }

    #[test]
    fn test_garbage_is_zero() {
        let n = inspect(&text("abc"));
        assert_eq!(n.value, 0.0);
        assert_eq!(n.outcome, Outcome::Malformed);

        // Several decimal points after cleanup cannot parse
        assert_eq!(normalize(&text("1.2.3")), 0.0);
    }

    #[test]
    fn test_missing_and_non_finite() {
        assert_eq!(normalize(&RawValue::Missing), 0.0);
        assert_eq!(inspect(&RawValue::Missing).outcome, Outcome::Missing);
        assert_eq!(normalize(&RawValue::Number(f64::INFINITY)), 0.0);
        assert_eq!(normalize(&RawValue::Number(f64::NAN)), 0.0);
        assert_eq!(normalize(&text("   ")), 0.0);
    }

    #[test]
    fn test_never_non_finite() {
        let huge = "9".repeat(400);
        let inputs = ["inf", "NaN", "1e400", "--", "$", ".", huge.as_str()];
        for input in inputs {
            assert!(normalize(&text(input)).is_finite(), "input {input:?}");
        }
    }

    #[test]
    fn test_as_text() {
        assert_eq!(RawValue::Number(1425.0).as_text(), Some("1425".to_string()));
        assert_eq!(text("  Palermo ").as_text(), Some("Palermo".to_string()));
        assert_eq!(text("").as_text(), None);
        assert_eq!(RawValue::Missing.as_text(), None);
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(10.0, 4.0), Some(2.5));
        assert_eq!(safe_div(10.0, 0.0), None);
        assert_eq!(finite_or_zero(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_raw_value_from_json() {
        let values: Vec<RawValue> = serde_json::from_str(r#"[12.5, "$ 3,5", null]"#).unwrap();
        assert_eq!(values[0], RawValue::Number(12.5));
        assert_eq!(normalize(&values[1]), 3.5);
        assert_eq!(values[2], RawValue::Missing);
    }

    #[test]
    fn test_unexpected_json_shapes_are_malformed() {
        let values: Vec<RawValue> = serde_json::from_str(r#"[true, [1, 2], {"a": 1}]"#).unwrap();
        for value in &values {
            assert!(matches!(value, RawValue::Other(_)));
            assert!(!value.is_missing());
            assert_eq!(value.as_text(), None);
            assert_eq!(inspect(value).outcome, Outcome::Malformed);
            assert_eq!(normalize(value), 0.0);
        }
    }
}
