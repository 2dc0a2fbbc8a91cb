use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Xlsx(String),

    #[error("unsupported file type '{0}'; upload a .csv or .xlsx file")]
    UnsupportedFormat(String),

    #[error("file is empty or has no data rows")]
    EmptyFile,

    #[error("line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("column '{0}' not found")]
    UnknownColumn(String),

    #[error("column '{column}' row {row}: cannot parse '{value}' as a date")]
    DateCoercion {
        column: String,
        row: usize,
        value: String,
    },
}

impl From<calamine::XlsxError> for IngestError {
    fn from(value: calamine::XlsxError) -> Self {
        Self::Xlsx(value.to_string())
    }
}
