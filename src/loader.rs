// 📥 Loader - sheet exports (CSV / JSON) in, enriched JSON out

use crate::normalize::RawValue;
use crate::output::VenueOutput;
use crate::record::RawRecord;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read raw rows from any CSV source with a header line
///
/// Headers are normalized (trimmed, lowercased, spaces → underscores) and
/// blank cells become missing values. Rows without an id column get their
/// 1-based position as id when they are turned into records.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV header")?.clone();

    let mut records = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let row = result.with_context(|| format!("Failed to read CSV row {}", line + 1))?;
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(header, cell)| (header.to_string(), RawValue::from_cell(cell)))
            .collect();
        records.push(record);
    }

    Ok(records)
}

pub fn load_csv(path: &Path) -> Result<Vec<RawRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let records = read_records(file)?;
    debug!(rows = records.len(), path = ?path, "loaded CSV");
    Ok(records)
}

/// Parse a JSON array of row objects
///
/// Cells are usually numbers, strings or null; any other value is kept and
/// later normalized to 0 as a malformed cell.
pub fn read_json_records(content: &str) -> Result<Vec<RawRecord>> {
    let rows: Vec<HashMap<String, RawValue>> =
        serde_json::from_str(content).context("Failed to parse venue JSON")?;

    // Re-key through the header normalizer so JSON and CSV look alike
    Ok(rows.into_iter().map(|row| row.into_iter().collect()).collect())
}

pub fn load_json(path: &Path) -> Result<Vec<RawRecord>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read JSON file: {:?}", path))?;
    let records = read_json_records(&content)?;
    debug!(rows = records.len(), path = ?path, "loaded JSON");
    Ok(records)
}

/// Dispatch on file extension
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => bail!("Unsupported input format '{}' for {:?} (expected .csv or .json)", other, path),
    }
}

pub fn write_json(path: &Path, outputs: &[VenueOutput]) -> Result<()> {
    let json = serde_json::to_string_pretty(outputs).context("Failed to serialize venue output")?;
    fs::write(path, json).with_context(|| format!("Failed to write output file: {:?}", path))?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
