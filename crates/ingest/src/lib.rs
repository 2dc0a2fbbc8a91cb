//! Loading uploaded tables and coercing their columns.

pub mod coerce;
pub mod csv_reader;
pub mod error;
pub mod summary;
pub mod table;
pub mod xlsx_reader;

use shared::domain::FileFormat;
use tracing::info;

pub use coerce::{coerce_datetime, coerce_numeric, column_index, parse_datetime, NumericColumn};
pub use error::IngestError;
pub use summary::{column_summaries, infer_kind, preview};
pub use table::{Cell, Table};

/// Loads an uploaded file, choosing the reader from the file name.
pub fn load_dataset(filename: &str, bytes: &[u8]) -> Result<(FileFormat, Table), IngestError> {
    let format = FileFormat::from_filename(filename)
        .ok_or_else(|| IngestError::UnsupportedFormat(filename.to_string()))?;
    if bytes.is_empty() {
        return Err(IngestError::EmptyFile);
    }
    let table = match format {
        FileFormat::Csv => csv_reader::read_csv(strip_bom(bytes))?,
        FileFormat::Xlsx => xlsx_reader::read_xlsx(bytes)?,
    };
    info!(
        filename,
        ?format,
        rows = table.row_count(),
        columns = table.headers.len(),
        "dataset loaded"
    );
    Ok((format, table))
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes)
}
