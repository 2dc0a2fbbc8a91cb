//! Diagnostic figures for the plot menu.
//!
//! A [`Figure`] is a chart description; the browser renders it.

use chrono::NaiveDateTime;
use shared::domain::PlotKind;
use shared::protocol::{Figure, Panel, PlotRequest, Trace};

use crate::acf::{autocorrelation, validate_lags};
use crate::decompose::{seasonal_decompose, validate_period};
use crate::error::SeriesError;
use crate::monthly::monthly_box_stats;
use crate::rolling::{rolling_mean, rolling_std, validate_window};
use crate::series::TimeSeries;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Checks the request's parameters against the menu bounds.
pub fn validate_plot(request: &PlotRequest) -> Result<(), SeriesError> {
    match request {
        PlotRequest::RollingMeanStd { window } => validate_window(*window),
        PlotRequest::Decomposition { period, .. } => validate_period(*period),
        PlotRequest::Autocorrelation { lags } => validate_lags(*lags),
        PlotRequest::Line | PlotRequest::BoxplotByMonth => Ok(()),
    }
}

pub fn build_figure(
    series: &TimeSeries,
    value_label: &str,
    request: &PlotRequest,
) -> Result<Figure, SeriesError> {
    validate_plot(request)?;
    match request {
        PlotRequest::Line => Ok(line_figure(series, value_label)),
        PlotRequest::RollingMeanStd { window } => {
            Ok(rolling_figure(series, value_label, *window))
        }
        PlotRequest::Decomposition { period, model } => {
            let x = all_dates(series, "seasonal decomposition")?;
            let d = seasonal_decompose(series.values(), *period, *model)?;
            let observed = d.observed.iter().copied().map(Some).collect();
            let seasonal = d.seasonal.iter().copied().map(Some).collect();
            let panel = |title: &str, y: Vec<Option<f64>>| Panel {
                title: Some(title.to_string()),
                y_title: None,
                traces: vec![line(title, x.clone(), y, None)],
            };
            Ok(Figure {
                kind: PlotKind::Decomposition,
                title: format!("Seasonal Decomposition of {value_label}"),
                x_title: Some("Date".into()),
                panels: vec![
                    panel("Observed", observed),
                    panel("Trend", d.trend),
                    panel("Seasonal", seasonal),
                    panel("Residual", d.residual),
                ],
            })
        }
        PlotRequest::BoxplotByMonth => Ok(boxplot_figure(series, value_label)),
        PlotRequest::Autocorrelation { lags } => {
            let acf = autocorrelation(series.values(), *lags)?;
            let x: Vec<u32> = (0..acf.acf.len() as u32).collect();
            let lower = acf.confidence.iter().map(|c| -c).collect();
            Ok(Figure {
                kind: PlotKind::Autocorrelation,
                title: format!("Autocorrelation of {value_label}"),
                x_title: Some("Lag".into()),
                panels: vec![Panel {
                    title: None,
                    y_title: Some("Autocorrelation".into()),
                    traces: vec![
                        Trace::Band {
                            name: "95% confidence".into(),
                            x: x.clone(),
                            lower,
                            upper: acf.confidence.clone(),
                        },
                        Trace::Stem {
                            name: "ACF".into(),
                            x,
                            y: acf.acf,
                        },
                    ],
                }],
            })
        }
    }
}

fn line(name: &str, x: Vec<NaiveDateTime>, y: Vec<Option<f64>>, color: Option<&str>) -> Trace {
    Trace::Line {
        name: name.to_string(),
        x,
        y,
        color: color.map(str::to_string),
    }
}

fn all_dates(
    series: &TimeSeries,
    operation: &'static str,
) -> Result<Vec<NaiveDateTime>, SeriesError> {
    series
        .dates()
        .iter()
        .copied()
        .collect::<Option<Vec<_>>>()
        .ok_or(SeriesError::MissingValues { operation })
}

fn line_figure(series: &TimeSeries, value_label: &str) -> Figure {
    let (x, y) = series.dated_rows();
    Figure {
        kind: PlotKind::Line,
        title: format!("{value_label} over time"),
        x_title: Some("Date".into()),
        panels: vec![Panel {
            title: None,
            y_title: Some(value_label.to_string()),
            traces: vec![line(value_label, x, y, None)],
        }],
    }
}

fn rolling_figure(series: &TimeSeries, value_label: &str, window: usize) -> Figure {
    // Windows run over the full series; undated rows are dropped afterwards.
    let means = rolling_mean(series.values(), window);
    let stds = rolling_std(series.values(), window);
    let mut x = Vec::new();
    let (mut original, mut mean, mut std) = (Vec::new(), Vec::new(), Vec::new());
    for (i, (ds, y)) in series.iter().enumerate() {
        if let Some(ds) = ds {
            x.push(ds);
            original.push(y);
            mean.push(means[i]);
            std.push(stds[i]);
        }
    }
    Figure {
        kind: PlotKind::RollingMeanStd,
        title: format!("Rolling Mean & Standard Deviation (window {window})"),
        x_title: Some("Date".into()),
        panels: vec![Panel {
            title: None,
            y_title: Some(value_label.to_string()),
            traces: vec![
                line("Original", x.clone(), original, None),
                line("Rolling Mean", x.clone(), mean, Some("red")),
                line("Rolling Std", x, std, Some("black")),
            ],
        }],
    }
}

fn boxplot_figure(series: &TimeSeries, value_label: &str) -> Figure {
    let traces = monthly_box_stats(series)
        .into_iter()
        .map(|(month, stats)| Trace::Box {
            name: MONTH_NAMES
                .get(month as usize - 1)
                .map_or_else(|| month.to_string(), |m| (*m).to_string()),
            stats,
        })
        .collect();
    Figure {
        kind: PlotKind::BoxplotByMonth,
        title: format!("{value_label} by Month"),
        x_title: Some("Month".into()),
        panels: vec![Panel {
            title: None,
            y_title: Some(value_label.to_string()),
            traces,
        }],
    }
}

#[cfg(test)]
#[path = "tests/figure_tests.rs"]
mod tests;
