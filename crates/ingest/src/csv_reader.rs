use std::io::Read;

use tracing::debug;

use crate::error::IngestError;
use crate::table::{normalize_headers, Cell, Table};

/// Reads a comma separated file with a header row.
pub fn read_csv<R: Read>(reader: R) -> Result<Table, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .double_quote(true)
        .quoting(true)
        .from_reader(reader);

    let raw_headers = rdr.headers()?.clone();
    if raw_headers.is_empty() || raw_headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::EmptyFile);
    }
    let headers = normalize_headers(raw_headers.iter());
    let width = headers.len();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        // Blank lines are skipped by the reader; a lone empty field is a blank row too.
        if record.len() == 1 && record[0].trim().is_empty() && width > 1 {
            continue;
        }
        if record.len() > width {
            return Err(IngestError::RaggedRow {
                line: record.position().map_or(0, |pos| pos.line() as usize),
                expected: width,
                found: record.len(),
            });
        }
        let mut row: Vec<Cell> = record.iter().map(Cell::sniff).collect();
        row.resize(width, Cell::Empty);
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(IngestError::EmptyFile);
    }
    debug!(columns = width, rows = rows.len(), "parsed csv");
    Ok(Table { headers, rows })
}
