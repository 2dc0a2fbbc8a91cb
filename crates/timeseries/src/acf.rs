use serde::Serialize;
use shared::protocol::{ACF_LAGS_MAX, ACF_LAGS_MIN};

use crate::error::SeriesError;

const OPERATION: &str = "autocorrelation";

/// 1.96: two-sided 95 % normal quantile.
const Z_95: f64 = 1.959_963_984_540_054;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Autocorrelation {
    /// `acf[k]` for lags `0..=nlags`; `acf[0]` is 1.
    pub acf: Vec<f64>,
    /// Bartlett 95 % half-widths around zero, same length as `acf`.
    pub confidence: Vec<f64>,
}

pub fn validate_lags(lags: usize) -> Result<(), SeriesError> {
    if !(ACF_LAGS_MIN..=ACF_LAGS_MAX).contains(&lags) {
        return Err(SeriesError::InvalidParameter {
            name: "lags",
            message: format!("{lags} is outside {ACF_LAGS_MIN}..={ACF_LAGS_MAX}"),
        });
    }
    Ok(())
}

/// Sample autocorrelation for lags up to `min(nlags, n - 1)`.
pub fn autocorrelation(
    values: &[Option<f64>],
    nlags: usize,
) -> Result<Autocorrelation, SeriesError> {
    let x: Vec<f64> = values
        .iter()
        .copied()
        .collect::<Option<Vec<f64>>>()
        .ok_or(SeriesError::MissingValues {
            operation: OPERATION,
        })?;
    let n = x.len();
    if n < 2 {
        return Err(SeriesError::TooShort {
            operation: OPERATION,
            required: 2,
            actual: n,
        });
    }
    let mean = x.iter().sum::<f64>() / n as f64;
    let centred: Vec<f64> = x.iter().map(|v| v - mean).collect();
    let c0: f64 = centred.iter().map(|v| v * v).sum::<f64>() / n as f64;
    if c0 <= (f64::EPSILON * mean.abs()).powi(2) {
        return Err(SeriesError::ConstantSeries {
            operation: OPERATION,
        });
    }

    let nlags = nlags.min(n - 1);
    let acf: Vec<f64> = (0..=nlags)
        .map(|k| {
            let ck: f64 = centred[..n - k]
                .iter()
                .zip(&centred[k..])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n as f64;
            ck / c0
        })
        .collect();

    // var(r_k) = (1 + 2 * sum_{j<k} r_j^2) / n, with lag 0 fixed at zero width.
    let mut confidence = vec![0.0; acf.len()];
    let mut cumulative = 0.0;
    for k in 1..acf.len() {
        if k > 1 {
            cumulative += acf[k - 1] * acf[k - 1];
        }
        confidence[k] = Z_95 * ((1.0 + 2.0 * cumulative) / n as f64).sqrt();
    }

    Ok(Autocorrelation { acf, confidence })
}
