use shared::protocol::{ROLLING_WINDOW_MAX, ROLLING_WINDOW_MIN};

use crate::error::SeriesError;
use crate::stats::{mean, sample_std};

pub fn validate_window(window: usize) -> Result<(), SeriesError> {
    if !(ROLLING_WINDOW_MIN..=ROLLING_WINDOW_MAX).contains(&window) {
        return Err(SeriesError::InvalidParameter {
            name: "rolling window",
            message: format!("{window} is outside {ROLLING_WINDOW_MIN}..={ROLLING_WINDOW_MAX}"),
        });
    }
    Ok(())
}

/// Trailing-window statistic; missing until `window` observations are
/// available and whenever the window contains a missing value.
fn rolling(
    values: &[Option<f64>],
    window: usize,
    stat: impl Fn(&[f64]) -> Option<f64>,
) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    let mut buf = Vec::with_capacity(window);
    for end in (window - 1)..values.len() {
        buf.clear();
        buf.extend(values[end + 1 - window..=end].iter().flatten().copied());
        if buf.len() == window {
            out[end] = stat(&buf);
        }
    }
    out
}

pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| Some(mean(w)))
}

pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, sample_std)
}
