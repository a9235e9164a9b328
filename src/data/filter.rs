use std::collections::BTreeSet;

use thiserror::Error;

use super::model::IndexTable;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Whether identifiers are matched against stock codes or company names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    ByCode,
    ByName,
}

/// Query with no usable inputs. Surfaced as a warning; the filter never runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("enter at least one stock code or company name")]
    NoIdentifiers,

    #[error("select at least one year")]
    NoYears,
}

/// Split comma-separated identifier input into a trimmed, deduplicated set.
/// Accepts both ASCII and fullwidth commas since the dataset is Chinese.
pub fn parse_identifiers(input: &str) -> BTreeSet<String> {
    input
        .split([',', '，'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Caller-level validation, checked before any filtering happens.
pub fn validate_query(
    identifiers: &BTreeSet<String>,
    years: &BTreeSet<i32>,
) -> Result<(), ValidationError> {
    if identifiers.is_empty() {
        return Err(ValidationError::NoIdentifiers);
    }
    if years.is_empty() {
        return Err(ValidationError::NoYears);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return indices of records matching the query, sorted by
/// (year asc, company_name asc, stock_code asc) regardless of table order.
///
/// Zero matches is an empty vec, not an error.
pub fn filter_indices(
    table: &IndexTable,
    identifiers: &BTreeSet<String>,
    years: &BTreeSet<i32>,
    mode: MatchMode,
) -> Vec<usize> {
    let mut indices: Vec<usize> = table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            if !years.contains(&rec.year) {
                return false;
            }
            match mode {
                MatchMode::ByCode => identifiers.contains(&rec.stock_code),
                MatchMode::ByName => identifiers.contains(&rec.company_name),
            }
        })
        .map(|(i, _)| i)
        .collect();

    indices.sort_by(|&a, &b| {
        let ra = &table.records[a];
        let rb = &table.records[b];
        ra.year
            .cmp(&rb.year)
            .then_with(|| ra.company_name.cmp(&rb.company_name))
            .then_with(|| ra.stock_code.cmp(&rb.stock_code))
    });
    indices
}

/// Round to 2 decimal places for display. Raw values stay untouched in the
/// table so chart geometry and hover keep full precision.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Callouts – point annotations for a single target year
// ---------------------------------------------------------------------------

/// Which side of the point the callout label goes. `Down` for negative
/// values so the label does not collide with the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetSign {
    Up,
    Down,
}

/// One annotation marking an entity's value at the target year.
#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    pub year: i32,
    pub label: String,
    pub value: f64,
    pub offset: OffsetSign,
}

/// Derive one callout per distinct entity present at `target_year` among the
/// filtered records. First record wins if an entity has duplicate rows for
/// the year. Pure derivation over the table; `indices` comes from
/// [`filter_indices`].
pub fn compute_callouts(table: &IndexTable, indices: &[usize], target_year: i32) -> Vec<Callout> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut callouts = Vec::new();

    for &idx in indices {
        let rec = &table.records[idx];
        if rec.year != target_year || !seen.insert(rec.company_name.as_str()) {
            continue;
        }
        let offset = if rec.index_value < 0.0 {
            OffsetSign::Down
        } else {
            OffsetSign::Up
        };
        callouts.push(Callout {
            year: rec.year,
            label: format!("{} {:.2}", rec.company_name, rec.index_value),
            value: rec.index_value,
            offset,
        });
    }
    callouts
}
