use std::collections::HashMap;

use chrono::NaiveDateTime;

/// Strings read as a missing value.
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Sniffs a raw text field into the narrowest cell type.
    pub fn sniff(raw: &str) -> Self {
        let trimmed = raw.trim();
        if MISSING_MARKERS.contains(&trimmed) {
            return Cell::Empty;
        }
        if let Ok(v) = trimmed.parse::<i64>() {
            return Cell::Int(v);
        }
        if let Ok(v) = trimmed.parse::<f64>() {
            if v.is_nan() {
                return Cell::Empty;
            }
            return Cell::Float(v);
        }
        match trimmed {
            "True" | "TRUE" | "true" => return Cell::Bool(true),
            "False" | "FALSE" | "false" => return Cell::Bool(false),
            _ => {}
        }
        Cell::Text(raw.to_string())
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Cell::Empty => serde_json::Value::Null,
            Cell::Int(v) => serde_json::Value::from(*v),
            Cell::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Cell::Bool(v) => serde_json::Value::Bool(*v),
            Cell::Text(v) => serde_json::Value::String(v.clone()),
            Cell::DateTime(v) => {
                serde_json::Value::String(v.format("%Y-%m-%d %H:%M:%S").to_string())
            }
        }
    }
}

/// A rectangular table: every row has `headers.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }
}

/// Trims header names, names blank headers `Unnamed: <i>` and suffixes
/// repeated names with `.1`, `.2`, ...
pub fn normalize_headers<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::new();
    for (i, field) in raw.into_iter().enumerate() {
        let trimmed = field.trim();
        let base = if trimmed.is_empty() {
            format!("Unnamed: {i}")
        } else {
            trimmed.to_string()
        };
        let mut name = base.clone();
        while let Some(count) = seen.get_mut(&name) {
            *count += 1;
            name = format!("{base}.{count}");
        }
        seen.insert(name.clone(), 0);
        seen.entry(base).or_insert(0);
        headers.push(name);
    }
    headers
}
