use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::IngestError;
use crate::table::{Cell, Table};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%Y%m%d"];

#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub values: Vec<Option<f64>>,
    /// Present cells that could not be read as a number.
    pub coerced: usize,
}

pub fn column_index(table: &Table, name: &str) -> Result<usize, IngestError> {
    table
        .headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| IngestError::UnknownColumn(name.to_string()))
}

/// Parses a single text value as a timestamp. Returns `None` when no
/// supported layout matches.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    // "2024-03" and "2024" resolve to the first day of the period.
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        if s.len() <= 7 {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        let year: i32 = s.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0);
    }
    None
}

/// Converts a column to timestamps. Missing cells stay `None`; any present
/// cell that does not parse fails the whole column.
pub fn coerce_datetime(
    table: &Table,
    column: &str,
) -> Result<Vec<Option<NaiveDateTime>>, IngestError> {
    let idx = column_index(table, column)?;
    let mut out = Vec::with_capacity(table.row_count());
    for (row, cell) in table.column(idx).enumerate() {
        let parsed = match cell {
            c if c.is_missing() => None,
            Cell::DateTime(dt) => Some(*dt),
            Cell::Int(v) => Some(parse_or_fail(&v.to_string(), column, row)?),
            Cell::Text(s) => Some(parse_or_fail(s, column, row)?),
            Cell::Float(v) => Some(parse_or_fail(&v.to_string(), column, row)?),
            Cell::Bool(v) => Some(parse_or_fail(&v.to_string(), column, row)?),
            Cell::Empty => None,
        };
        out.push(parsed);
    }
    Ok(out)
}

fn parse_or_fail(raw: &str, column: &str, row: usize) -> Result<NaiveDateTime, IngestError> {
    parse_datetime(raw).ok_or_else(|| IngestError::DateCoercion {
        column: column.to_string(),
        row,
        value: raw.to_string(),
    })
}

/// Converts a column to numbers, turning unreadable values into missing ones.
pub fn coerce_numeric(table: &Table, column: &str) -> Result<NumericColumn, IngestError> {
    let idx = column_index(table, column)?;
    let mut coerced = 0usize;
    let values = table
        .column(idx)
        .map(|cell| match cell {
            c if c.is_missing() => None,
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Cell::Text(s) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => {
                    coerced += 1;
                    None
                }
            },
            Cell::DateTime(_) | Cell::Empty => {
                coerced += 1;
                None
            }
        })
        .collect();
    Ok(NumericColumn { values, coerced })
}

#[cfg(test)]
#[path = "tests/coerce_tests.rs"]
mod tests;
