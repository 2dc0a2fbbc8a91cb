//! The analysis pipeline behind every entry point.
//!
//! Each call runs from the upload to the forecast setup in one pass. Faults in
//! the request come back as [`ApiError`]; faults in the data that only affect
//! one stage are reported as notices inside the response.

use ingest::{
    coerce_datetime, coerce_numeric, column_index, column_summaries, load_dataset, preview, Cell,
    IngestError, Table,
};
use shared::{
    domain::{FileFormat, FillStrategy, Notice, PlotKind},
    error::{ApiError, ErrorCode},
    protocol::{
        AnalyzeRequest, AnalyzeResponse, DatasetOverview, ForecastParams, MissingReport,
        ParameterSpec, PlotDescriptor, TablePreview, ACF_LAGS_DEFAULT, ACF_LAGS_MAX,
        ACF_LAGS_MIN, DEFAULT_PREVIEW_ROWS, ROLLING_WINDOW_DEFAULT, ROLLING_WINDOW_MAX,
        ROLLING_WINDOW_MIN, SEASONAL_PERIOD_DEFAULT, SEASONAL_PERIOD_MAX, SEASONAL_PERIOD_MIN,
    },
};
use timeseries::{
    build_figure, prepare_forecast, validate_params, validate_plot, SeriesError, TimeSeries,
};
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_MAX_ROWS: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisLimits {
    pub preview_rows: usize,
    pub max_rows: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApiContext {
    pub limits: AnalysisLimits,
}

impl ApiContext {
    pub fn new(limits: AnalysisLimits) -> Self {
        Self { limits }
    }
}

pub fn inspect_dataset(
    ctx: &ApiContext,
    filename: &str,
    bytes: &[u8],
) -> Result<DatasetOverview, ApiError> {
    let (format, table) = load(ctx, filename, bytes)?;
    Ok(overview(ctx, filename, format, &table))
}

pub fn analyze(
    ctx: &ApiContext,
    filename: &str,
    bytes: &[u8],
    request: &AnalyzeRequest,
) -> Result<AnalyzeResponse, ApiError> {
    let run_id = Uuid::new_v4();
    validate_request(request)?;

    let (format, table) = load(ctx, filename, bytes)?;
    info!(%run_id, filename, rows = table.row_count(), "dataset loaded");
    column_index(&table, &request.date_column).map_err(ingest_error)?;
    column_index(&table, &request.value_column).map_err(ingest_error)?;

    let mut response = AnalyzeResponse {
        run_id,
        overview: overview(ctx, filename, format, &table),
        date_column: request.date_column.clone(),
        value_column: request.value_column.clone(),
        missing: None,
        prophet_preview: None,
        figure: None,
        forecast: None,
        notices: vec![Notice::success("Data loaded successfully")],
    };

    let dates = match coerce_datetime(&table, &request.date_column) {
        Ok(dates) => dates,
        Err(err) => {
            warn!(%run_id, column = %request.date_column, error = %err, "date conversion failed");
            response.notices.push(Notice::error(format!(
                "Could not convert '{}' to dates: {err}",
                request.date_column
            )));
            return Ok(response);
        }
    };
    response
        .notices
        .push(Notice::success("Date column converted to datetime."));

    let numeric = coerce_numeric(&table, &request.value_column).map_err(ingest_error)?;
    if numeric.coerced > 0 {
        response.notices.push(Notice::warning(format!(
            "{} value(s) in '{}' are not numbers and were treated as missing.",
            numeric.coerced, request.value_column
        )));
    }

    let mut series = TimeSeries::new(dates, numeric.values).map_err(series_internal)?;
    series.sort_by_date();
    response.missing = Some(repair_missing(&mut series, request.fill, &mut response.notices));
    response.prophet_preview = Some(prophet_preview(&series, ctx.limits.preview_rows));

    if let Some(plot) = &request.plot {
        match build_figure(&series, &request.value_column, plot) {
            Ok(figure) => response.figure = Some(figure),
            Err(err) => {
                warn!(%run_id, plot = plot.kind().label(), error = %err, "plot failed");
                response.notices.push(Notice::error(format!(
                    "Could not draw the {}: {err}",
                    plot.kind().label()
                )));
            }
        }
    }

    match prepare_forecast(&series, &request.forecast) {
        Ok(setup) => response.forecast = Some(setup),
        Err(err) => {
            warn!(%run_id, error = %err, "forecast setup skipped");
            response
                .notices
                .push(Notice::warning(format!("Forecast setup unavailable: {err}")));
        }
    }

    info!(
        %run_id,
        rows = series.len(),
        notices = response.notices.len(),
        "analysis finished"
    );
    Ok(response)
}

/// The plot menu with each entry's parameter bounds.
pub fn plot_catalog() -> Vec<PlotDescriptor> {
    PlotKind::ALL
        .iter()
        .map(|kind| {
            let parameters = match kind {
                PlotKind::RollingMeanStd => vec![parameter(
                    "window",
                    ROLLING_WINDOW_DEFAULT,
                    ROLLING_WINDOW_MIN,
                    Some(ROLLING_WINDOW_MAX),
                )],
                PlotKind::Decomposition => vec![parameter(
                    "period",
                    SEASONAL_PERIOD_DEFAULT,
                    SEASONAL_PERIOD_MIN,
                    Some(SEASONAL_PERIOD_MAX),
                )],
                PlotKind::Autocorrelation => vec![parameter(
                    "lags",
                    ACF_LAGS_DEFAULT,
                    ACF_LAGS_MIN,
                    Some(ACF_LAGS_MAX),
                )],
                PlotKind::Line | PlotKind::BoxplotByMonth => Vec::new(),
            };
            PlotDescriptor {
                kind: *kind,
                label: kind.label().to_string(),
                parameters,
            }
        })
        .collect()
}

pub fn forecast_defaults() -> ForecastParams {
    ForecastParams::default()
}

pub fn validate_request(request: &AnalyzeRequest) -> Result<(), ApiError> {
    if let Some(plot) = &request.plot {
        validate_plot(plot).map_err(|err| ApiError::validation(err.to_string()))?;
    }
    validate_params(&request.forecast).map_err(|err| ApiError::validation(err.to_string()))
}

fn parameter(name: &str, default: usize, min: usize, max: Option<usize>) -> ParameterSpec {
    ParameterSpec {
        name: name.to_string(),
        default: default as f64,
        min: min as f64,
        max: max.map(|m| m as f64),
    }
}

fn load(ctx: &ApiContext, filename: &str, bytes: &[u8]) -> Result<(FileFormat, Table), ApiError> {
    let (format, table) = load_dataset(filename, bytes).map_err(ingest_error)?;
    if table.row_count() > ctx.limits.max_rows {
        return Err(ApiError::new(
            ErrorCode::PayloadTooLarge,
            format!(
                "dataset has {} rows; the limit is {}",
                table.row_count(),
                ctx.limits.max_rows
            ),
        ));
    }
    Ok((format, table))
}

fn overview(
    ctx: &ApiContext,
    filename: &str,
    format: FileFormat,
    table: &Table,
) -> DatasetOverview {
    DatasetOverview {
        filename: filename.to_string(),
        format,
        row_count: table.row_count(),
        columns: column_summaries(table),
        preview: preview(table, ctx.limits.preview_rows),
    }
}

fn repair_missing(
    series: &mut TimeSeries,
    strategy: FillStrategy,
    notices: &mut Vec<Notice>,
) -> MissingReport {
    let before = series.missing_counts();
    let rows_before = series.len();
    if !before.any() {
        notices.push(Notice::success("No missing values in selected columns."));
        return MissingReport {
            date_missing: 0,
            value_missing: 0,
            strategy: None,
            rows_before,
            rows_after: rows_before,
            remaining_date_missing: 0,
            remaining_value_missing: 0,
        };
    }

    notices.push(Notice::warning("Missing values detected in selected columns."));
    series.apply_fill(strategy);
    match strategy {
        FillStrategy::DoNothing => {}
        FillStrategy::DropRows => {
            notices.push(Notice::success("Dropped rows with missing date or target values."));
        }
        FillStrategy::ForwardFill => {
            notices.push(Notice::success("Filled missing values using forward fill."));
        }
        FillStrategy::BackwardFill => {
            notices.push(Notice::success("Filled missing values using backward fill."));
        }
    }
    let after = series.missing_counts();
    MissingReport {
        date_missing: before.date,
        value_missing: before.value,
        strategy: Some(strategy),
        rows_before,
        rows_after: series.len(),
        remaining_date_missing: after.date,
        remaining_value_missing: after.value,
    }
}

/// The first rows of the series under the `ds` / `y` names.
fn prophet_preview(series: &TimeSeries, rows: usize) -> TablePreview {
    TablePreview {
        columns: vec!["ds".into(), "y".into()],
        rows: series
            .iter()
            .take(rows)
            .map(|(ds, y)| {
                let ds = ds.map_or(Cell::Empty, Cell::DateTime);
                let y = y.map_or(Cell::Empty, Cell::Float);
                vec![ds.to_json(), y.to_json()]
            })
            .collect(),
    }
}

fn ingest_error(err: IngestError) -> ApiError {
    match err {
        IngestError::UnsupportedFormat(_) => {
            ApiError::new(ErrorCode::UnsupportedFormat, err.to_string())
        }
        IngestError::UnknownColumn(_) | IngestError::DateCoercion { .. } => {
            ApiError::validation(err.to_string())
        }
        IngestError::Csv(_)
        | IngestError::Xlsx(_)
        | IngestError::EmptyFile
        | IngestError::RaggedRow { .. } => ApiError::validation(format!("Error loading file: {err}")),
    }
}

fn series_internal(err: SeriesError) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
