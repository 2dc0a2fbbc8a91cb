use shared::domain::ColumnKind;
use shared::protocol::{ColumnSummary, TablePreview};

use crate::table::{Cell, Table};

/// Infers the dtype of a column from its present cells.
pub fn infer_kind(table: &Table, index: usize) -> ColumnKind {
    let mut ints = 0usize;
    let mut floats = 0usize;
    let mut bools = 0usize;
    let mut dates = 0usize;
    let mut texts = 0usize;
    let mut missing = 0usize;

    for cell in table.column(index) {
        match cell {
            c if c.is_missing() => missing += 1,
            Cell::Int(_) => ints += 1,
            Cell::Float(_) => floats += 1,
            Cell::Bool(_) => bools += 1,
            Cell::DateTime(_) => dates += 1,
            Cell::Text(_) => texts += 1,
            Cell::Empty => missing += 1,
        }
    }

    let present = ints + floats + bools + dates + texts;
    if present == 0 {
        return ColumnKind::Float;
    }
    if texts > 0 {
        return ColumnKind::Text;
    }
    if ints == present {
        return if missing > 0 {
            ColumnKind::Float
        } else {
            ColumnKind::Integer
        };
    }
    if ints + floats == present {
        return ColumnKind::Float;
    }
    if bools == present && missing == 0 {
        return ColumnKind::Boolean;
    }
    if dates == present {
        return ColumnKind::Datetime;
    }
    ColumnKind::Text
}

pub fn column_summaries(table: &Table) -> Vec<ColumnSummary> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let kind = infer_kind(table, idx);
            ColumnSummary {
                name: name.clone(),
                kind,
                dtype: kind.dtype_label().to_string(),
                missing: table.column(idx).filter(|c| c.is_missing()).count(),
            }
        })
        .collect()
}

/// First `rows` rows of the table.
pub fn preview(table: &Table, rows: usize) -> TablePreview {
    TablePreview {
        columns: table.headers.clone(),
        rows: table
            .rows
            .iter()
            .take(rows)
            .map(|row| row.iter().map(Cell::to_json).collect())
            .collect(),
    }
}
