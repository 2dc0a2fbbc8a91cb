use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::IngestError;
use crate::table::{normalize_headers, Cell, Table};

/// Reads the first worksheet of an `.xlsx` workbook; its first row is the header.
pub fn read_xlsx(bytes: &[u8]) -> Result<Table, IngestError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::EmptyFile)??;

    let mut rows_iter = range.rows();
    let Some(header_row) = rows_iter.next() else {
        return Err(IngestError::EmptyFile);
    };
    let header_text: Vec<String> = header_row.iter().map(header_to_string).collect();
    let headers = normalize_headers(header_text.iter().map(String::as_str));
    let width = headers.len();

    let mut rows = Vec::new();
    for row in rows_iter {
        let mut cells: Vec<Cell> = row.iter().map(data_to_cell).collect();
        if cells.iter().all(Cell::is_missing) {
            continue;
        }
        cells.resize(width, Cell::Empty);
        rows.push(cells);
    }

    if rows.is_empty() {
        return Err(IngestError::EmptyFile);
    }
    debug!(columns = width, rows = rows.len(), "parsed xlsx");
    Ok(Table { headers, rows })
}

fn header_to_string(data: &Data) -> String {
    match data_to_cell(data) {
        Cell::Empty => String::new(),
        Cell::Int(v) => v.to_string(),
        Cell::Float(v) => v.to_string(),
        Cell::Bool(v) => v.to_string(),
        Cell::Text(v) => v,
        Cell::DateTime(v) => v.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(v) => Cell::Int(*v),
        Data::Float(v) => {
            if v.is_nan() {
                Cell::Empty
            } else if v.fract() == 0.0 && v.abs() < 9.0e15 {
                Cell::Int(*v as i64)
            } else {
                Cell::Float(*v)
            }
        }
        Data::Bool(v) => Cell::Bool(*v),
        Data::String(v) => Cell::sniff(v),
        Data::DateTime(v) => excel_serial_to_datetime(v.as_f64())
            .map(Cell::DateTime)
            .unwrap_or(Cell::Empty),
        Data::DateTimeIso(v) | Data::DurationIso(v) => Cell::Text(v.clone()),
    }
}

/// Converts an Excel 1900-system serial day number to a timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    // Day 0 is 1899-12-30 once the phantom 1900-02-29 is accounted for.
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}
