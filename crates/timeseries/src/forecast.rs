use shared::protocol::{
    ForecastParams, ForecastSetup, ProphetRow, CHANGEPOINT_PRIOR_MAX, CHANGEPOINT_PRIOR_MIN,
    FORECAST_PERIODS_MAX, FORECAST_PERIODS_MIN, SEASONALITY_PRIOR_MAX, SEASONALITY_PRIOR_MIN,
};
use tracing::debug;

use crate::error::SeriesError;
use crate::frequency::{future_dates, infer_frequency, median_step, Frequency};
use crate::series::TimeSeries;

const OPERATION: &str = "forecast setup";

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), SeriesError> {
    if !value.is_finite() || value < min || value > max {
        return Err(SeriesError::InvalidParameter {
            name,
            message: format!("{value} is outside {min}..={max}"),
        });
    }
    Ok(())
}

pub fn validate_params(params: &ForecastParams) -> Result<(), SeriesError> {
    if !(FORECAST_PERIODS_MIN..=FORECAST_PERIODS_MAX).contains(&params.periods) {
        return Err(SeriesError::InvalidParameter {
            name: "forecast periods",
            message: format!(
                "{} is outside {FORECAST_PERIODS_MIN}..={FORECAST_PERIODS_MAX}",
                params.periods
            ),
        });
    }
    check_range(
        "changepoint prior scale",
        params.changepoint_prior_scale,
        CHANGEPOINT_PRIOR_MIN,
        CHANGEPOINT_PRIOR_MAX,
    )?;
    check_range(
        "seasonality prior scale",
        params.seasonality_prior_scale,
        SEASONALITY_PRIOR_MIN,
        SEASONALITY_PRIOR_MAX,
    )
}

/// Builds the model-ready history and the horizon that follows it.
///
/// Every row must carry a date and at least two rows must carry a value.
/// Missing values stay in the history as nulls.
/// The horizon uses the detected cadence, then the median spacing, then days.
pub fn prepare_forecast(
    series: &TimeSeries,
    params: &ForecastParams,
) -> Result<ForecastSetup, SeriesError> {
    validate_params(params)?;
    let observations = series.values().iter().flatten().count();
    if observations < 2 {
        return Err(SeriesError::TooShort {
            operation: OPERATION,
            required: 2,
            actual: observations,
        });
    }
    let history: Vec<ProphetRow> = series
        .iter()
        .map(|(ds, y)| ds.map(|ds| ProphetRow { ds, y }))
        .collect::<Option<_>>()
        .ok_or(SeriesError::MissingValues {
            operation: OPERATION,
        })?;

    let dates: Vec<_> = history.iter().map(|row| row.ds).collect();
    let inferred = infer_frequency(&dates);
    let step = inferred
        .or_else(|| median_step(&dates))
        .unwrap_or(Frequency::Daily);
    let future = match dates.iter().max() {
        Some(last) => future_dates(*last, step, params.periods as usize),
        None => Vec::new(),
    };
    debug!(
        rows = history.len(),
        frequency = %step.code(),
        horizon = future.len(),
        "forecast setup prepared"
    );

    Ok(ForecastSetup {
        params: params.clone(),
        frequency: inferred.map(Frequency::code),
        history,
        future,
    })
}
