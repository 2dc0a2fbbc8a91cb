use super::*;
use shared::domain::{NoticeLevel, PlotKind};
use shared::protocol::{PlotRequest, Trace};

const MONTHLY: &str = "\
month,sales,region
2023-03-01,30,north
2023-01-01,10,north
2023-02-01,,south
2023-04-01,40,south
2023-05-01,50,north
2023-06-01,60,north
";

fn request(fill: FillStrategy, plot: Option<PlotRequest>) -> AnalyzeRequest {
    AnalyzeRequest {
        date_column: "month".into(),
        value_column: "sales".into(),
        fill,
        plot,
        forecast: ForecastParams {
            periods: 3,
            ..ForecastParams::default()
        },
    }
}

fn messages(response: &AnalyzeResponse, level: NoticeLevel) -> Vec<&str> {
    response
        .notices
        .iter()
        .filter(|n| n.level == level)
        .map(|n| n.message.as_str())
        .collect()
}

#[test]
fn inspect_reports_columns_and_preview() {
    let ctx = ApiContext::default();
    let overview = inspect_dataset(&ctx, "sales.csv", MONTHLY.as_bytes()).expect("overview");
    assert_eq!(overview.format, FileFormat::Csv);
    assert_eq!(overview.row_count, 6);
    assert_eq!(overview.preview.rows.len(), 5);
    let dtypes: Vec<&str> = overview.columns.iter().map(|c| c.dtype.as_str()).collect();
    assert_eq!(dtypes, vec!["object", "float64", "object"]);
    assert_eq!(overview.columns[1].missing, 1);
}

#[test]
fn analyze_sorts_fills_and_prepares_forecast() {
    let ctx = ApiContext::default();
    let response = analyze(
        &ctx,
        "sales.csv",
        MONTHLY.as_bytes(),
        &request(FillStrategy::ForwardFill, Some(PlotRequest::Line)),
    )
    .expect("analysis");

    let missing = response.missing.as_ref().expect("missing report");
    assert_eq!(missing.value_missing, 1);
    assert_eq!(missing.strategy, Some(FillStrategy::ForwardFill));
    assert_eq!(missing.remaining_value_missing, 0);
    assert_eq!(missing.rows_after, 6);

    let preview = response.prophet_preview.as_ref().expect("preview");
    assert_eq!(preview.columns, vec!["ds", "y"]);
    assert_eq!(preview.rows[0][0], "2023-01-01 00:00:00");
    // February takes January's value after the forward fill.
    assert_eq!(preview.rows[1][1], 10.0);

    assert_eq!(response.figure.as_ref().map(|f| f.kind), Some(PlotKind::Line));
    let forecast = response.forecast.as_ref().expect("forecast");
    assert_eq!(forecast.frequency.as_deref(), Some("MS"));
    assert_eq!(forecast.future.len(), 3);

    assert!(messages(&response, NoticeLevel::Success)
        .contains(&"Filled missing values using forward fill."));
    assert!(messages(&response, NoticeLevel::Warning)
        .contains(&"Missing values detected in selected columns."));
}

#[test]
fn drop_rows_shrinks_the_series() {
    let response = analyze(
        &ApiContext::default(),
        "sales.csv",
        MONTHLY.as_bytes(),
        &request(FillStrategy::DropRows, None),
    )
    .expect("analysis");
    let missing = response.missing.expect("missing report");
    assert_eq!(missing.rows_before, 6);
    assert_eq!(missing.rows_after, 5);
    assert!(response.figure.is_none());
}

#[test]
fn clean_columns_skip_the_repair() {
    let data = "date,y\n2024-01-01,1\n2024-01-02,2\n2024-01-03,3\n";
    let mut req = request(FillStrategy::DropRows, None);
    req.date_column = "date".into();
    req.value_column = "y".into();
    let response =
        analyze(&ApiContext::default(), "d.csv", data.as_bytes(), &req).expect("analysis");
    let missing = response.missing.as_ref().expect("missing report");
    assert_eq!(missing.strategy, None);
    assert!(messages(&response, NoticeLevel::Success)
        .contains(&"No missing values in selected columns."));
}

#[test]
fn unparsable_dates_stop_after_the_overview() {
    let data = "when,v\nyesterday,1\ntoday,2\n";
    let mut req = request(FillStrategy::DoNothing, Some(PlotRequest::Line));
    req.date_column = "when".into();
    req.value_column = "v".into();
    let response =
        analyze(&ApiContext::default(), "d.csv", data.as_bytes(), &req).expect("analysis");
    assert_eq!(response.overview.row_count, 2);
    assert!(response.missing.is_none());
    assert!(response.figure.is_none());
    assert!(response.forecast.is_none());
    assert_eq!(messages(&response, NoticeLevel::Error).len(), 1);
}

#[test]
fn non_numeric_values_are_counted() {
    let data = "date,v\n2024-01-01,1\n2024-01-02,oops\n2024-01-03,3\n";
    let mut req = request(FillStrategy::DoNothing, None);
    req.date_column = "date".into();
    req.value_column = "v".into();
    let response =
        analyze(&ApiContext::default(), "d.csv", data.as_bytes(), &req).expect("analysis");
    let warnings = messages(&response, NoticeLevel::Warning);
    assert!(warnings.iter().any(|w| w.starts_with("1 value(s) in 'v'")));
    assert_eq!(response.missing.expect("report").value_missing, 1);
}

#[test]
fn plot_failures_are_reported_in_band() {
    let response = analyze(
        &ApiContext::default(),
        "sales.csv",
        MONTHLY.as_bytes(),
        &request(
            FillStrategy::DoNothing,
            Some(PlotRequest::Decomposition {
                period: 12,
                model: Default::default(),
            }),
        ),
    )
    .expect("analysis");
    assert!(response.figure.is_none());
    let errors = messages(&response, NoticeLevel::Error);
    assert!(errors[0].starts_with("Could not draw the Decomposition Plot"));
    // The rest of the pipeline still ran.
    assert!(response.forecast.is_some());
}

#[test]
fn rolling_plot_keeps_sorted_order() {
    let response = analyze(
        &ApiContext::default(),
        "sales.csv",
        MONTHLY.as_bytes(),
        &request(
            FillStrategy::BackwardFill,
            Some(PlotRequest::RollingMeanStd { window: 3 }),
        ),
    )
    .expect("analysis");
    let figure = response.figure.expect("figure");
    let Trace::Line { y, .. } = &figure.panels[0].traces[1] else {
        panic!("expected rolling mean");
    };
    // Jan 10, Feb 30 (back-filled), Mar 30.
    let third = y[2].expect("mean");
    assert!((third - 70.0 / 3.0).abs() < 1e-9);
}

#[test]
fn request_faults_are_validation_errors() {
    let ctx = ApiContext::default();
    let mut req = request(
        FillStrategy::DoNothing,
        Some(PlotRequest::Autocorrelation { lags: 0 }),
    );
    let err = analyze(&ctx, "sales.csv", MONTHLY.as_bytes(), &req).expect_err("lags");
    assert_eq!(err.code, ErrorCode::Validation);

    req.plot = Some(PlotRequest::Decomposition {
        period: usize::MAX,
        model: Default::default(),
    });
    let err = analyze(&ctx, "sales.csv", MONTHLY.as_bytes(), &req).expect_err("period");
    assert_eq!(err.code, ErrorCode::Validation);

    req.plot = None;
    req.value_column = "revenue".into();
    let err = analyze(&ctx, "sales.csv", MONTHLY.as_bytes(), &req).expect_err("column");
    assert_eq!(err.code, ErrorCode::Validation);
    assert!(err.message.contains("revenue"));

    req.value_column = "sales".into();
    req.forecast.periods = 400;
    let err = analyze(&ctx, "sales.csv", MONTHLY.as_bytes(), &req).expect_err("periods");
    assert_eq!(err.code, ErrorCode::Validation);
}

#[test]
fn upload_faults_map_to_error_codes() {
    let ctx = ApiContext::default();
    let err = inspect_dataset(&ctx, "sales.json", b"{}").expect_err("format");
    assert_eq!(err.code, ErrorCode::UnsupportedFormat);

    let err = inspect_dataset(&ctx, "sales.csv", b"").expect_err("empty");
    assert_eq!(err.code, ErrorCode::Validation);

    let small = ApiContext::new(AnalysisLimits {
        preview_rows: 2,
        max_rows: 3,
    });
    let err = inspect_dataset(&small, "sales.csv", MONTHLY.as_bytes()).expect_err("too large");
    assert_eq!(err.code, ErrorCode::PayloadTooLarge);
}

#[test]
fn catalog_lists_every_plot_with_bounds() {
    let catalog = plot_catalog();
    assert_eq!(catalog.len(), 5);
    assert_eq!(catalog[0].label, "Line Plot");
    let rolling = &catalog[1];
    assert_eq!(rolling.parameters[0].name, "window");
    assert_eq!(rolling.parameters[0].min, 3.0);
    assert_eq!(rolling.parameters[0].max, Some(30.0));
    assert_eq!(catalog[2].parameters[0].max, Some(365.0));
    assert_eq!(forecast_defaults().periods, 30);
}
