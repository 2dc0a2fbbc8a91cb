//! Classical moving-average decomposition.

use serde::Serialize;
use shared::domain::DecompositionModel;
use shared::protocol::{SEASONAL_PERIOD_MAX, SEASONAL_PERIOD_MIN};

use crate::error::SeriesError;

const OPERATION: &str = "seasonal decomposition";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decomposition {
    pub model: DecompositionModel,
    pub period: usize,
    pub observed: Vec<f64>,
    /// Missing for the `period / 2` observations at each edge.
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
}

pub fn validate_period(period: usize) -> Result<(), SeriesError> {
    if !(SEASONAL_PERIOD_MIN..=SEASONAL_PERIOD_MAX).contains(&period) {
        return Err(SeriesError::InvalidParameter {
            name: "seasonal period",
            message: format!(
                "must be between {SEASONAL_PERIOD_MIN} and {SEASONAL_PERIOD_MAX}, got {period}"
            ),
        });
    }
    Ok(())
}

/// Centred moving-average weights; a `2 x period` filter for even periods.
fn trend_weights(period: usize) -> Vec<f64> {
    let p = period as f64;
    if period % 2 == 0 {
        let mut w = vec![1.0 / p; period + 1];
        w[0] = 0.5 / p;
        w[period] = 0.5 / p;
        w
    } else {
        vec![1.0 / p; period]
    }
}

pub fn seasonal_decompose(
    values: &[Option<f64>],
    period: usize,
    model: DecompositionModel,
) -> Result<Decomposition, SeriesError> {
    validate_period(period)?;
    let observed: Vec<f64> = values
        .iter()
        .copied()
        .collect::<Option<Vec<f64>>>()
        .ok_or(SeriesError::MissingValues {
            operation: OPERATION,
        })?;
    let n = observed.len();
    if n < 2 * period {
        return Err(SeriesError::TooShort {
            operation: OPERATION,
            required: 2 * period,
            actual: n,
        });
    }
    if model == DecompositionModel::Multiplicative && observed.iter().any(|v| *v <= 0.0) {
        return Err(SeriesError::InvalidParameter {
            name: "model",
            message: "multiplicative decomposition requires strictly positive values".into(),
        });
    }

    let weights = trend_weights(period);
    let half = weights.len() / 2;
    let mut trend = vec![None; n];
    for (i, slot) in trend.iter_mut().enumerate().take(n - half).skip(half) {
        let window = &observed[i - half..=i + half];
        *slot = Some(window.iter().zip(&weights).map(|(x, w)| x * w).sum());
    }

    let detrended: Vec<Option<f64>> = observed
        .iter()
        .zip(&trend)
        .map(|(x, t)| {
            t.map(|t| match model {
                DecompositionModel::Additive => x - t,
                DecompositionModel::Multiplicative => x / t,
            })
        })
        .collect();

    let mut averages = vec![0.0; period];
    for (pos, avg) in averages.iter_mut().enumerate() {
        let cycle: Vec<f64> = detrended
            .iter()
            .skip(pos)
            .step_by(period)
            .flatten()
            .copied()
            .collect();
        *avg = cycle.iter().sum::<f64>() / cycle.len() as f64;
    }
    let centre = averages.iter().sum::<f64>() / period as f64;
    for avg in averages.iter_mut() {
        match model {
            DecompositionModel::Additive => *avg -= centre,
            DecompositionModel::Multiplicative => *avg /= centre,
        }
    }

    let seasonal: Vec<f64> = (0..n).map(|i| averages[i % period]).collect();
    let residual = detrended
        .iter()
        .zip(&seasonal)
        .map(|(d, s)| {
            d.map(|d| match model {
                DecompositionModel::Additive => d - s,
                DecompositionModel::Multiplicative => d / s,
            })
        })
        .collect();

    Ok(Decomposition {
        model,
        period,
        observed,
        trend,
        seasonal,
        residual,
    })
}

#[cfg(test)]
#[path = "tests/decompose_tests.rs"]
mod tests;
