use std::collections::BTreeMap;

use chrono::Datelike;
use shared::protocol::BoxStats;

use crate::series::TimeSeries;
use crate::stats::percentile_sorted;

const WHISKER_IQR: f64 = 1.5;

/// Box-plot summary of a group of values; `None` when the group is empty.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = percentile_sorted(&sorted, 25.0);
    let median = percentile_sorted(&sorted, 50.0);
    let q3 = percentile_sorted(&sorted, 75.0);
    let iqr = q3 - q1;
    let low_fence = q1 - WHISKER_IQR * iqr;
    let high_fence = q3 + WHISKER_IQR * iqr;

    let inside: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|v| *v >= low_fence && *v <= high_fence)
        .collect();
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < low_fence || *v > high_fence)
        .collect();

    Some(BoxStats {
        count: sorted.len(),
        min: sorted[0],
        q1,
        median,
        q3,
        max: sorted[sorted.len() - 1],
        lower_whisker: inside.first().copied().unwrap_or(q1),
        upper_whisker: inside.last().copied().unwrap_or(q3),
        outliers,
    })
}

/// Box statistics per calendar month (1-12) present in the series.
/// Rows without a date or a value are skipped.
pub fn monthly_box_stats(series: &TimeSeries) -> Vec<(u32, BoxStats)> {
    let mut groups: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for (ds, y) in series.iter() {
        if let (Some(ds), Some(y)) = (ds, y) {
            groups.entry(ds.month()).or_default().push(y);
        }
    }
    groups
        .into_iter()
        .filter_map(|(month, values)| box_stats(&values).map(|stats| (month, stats)))
        .collect()
}
