//! Cleaning, diagnostics and forecast preparation for one selected series.

pub mod acf;
pub mod decompose;
pub mod error;
pub mod figure;
pub mod forecast;
pub mod frequency;
pub mod monthly;
pub mod rolling;
pub mod series;
pub mod stats;

pub use acf::{autocorrelation, Autocorrelation};
pub use decompose::{seasonal_decompose, Decomposition};
pub use error::SeriesError;
pub use figure::{build_figure, validate_plot};
pub use forecast::{prepare_forecast, validate_params};
pub use frequency::{future_dates, infer_frequency, Frequency};
pub use monthly::monthly_box_stats;
pub use rolling::{rolling_mean, rolling_std};
pub use series::{MissingCounts, TimeSeries};
