use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("series has {actual} observations; {operation} needs at least {required}")]
    TooShort {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("{operation} does not handle missing values; choose a cleaning option first")]
    MissingValues { operation: &'static str },

    #[error("{operation} is undefined for a constant series")]
    ConstantSeries { operation: &'static str },

    #[error("invalid {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("date and value columns differ in length ({dates} vs {values})")]
    LengthMismatch { dates: usize, values: usize },
}
