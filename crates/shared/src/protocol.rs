use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    ColumnKind, DecompositionModel, FileFormat, FillStrategy, Notice, PlotKind, SeasonalityMode,
};

pub const DEFAULT_PREVIEW_ROWS: usize = 5;

pub const ROLLING_WINDOW_MIN: usize = 3;
pub const ROLLING_WINDOW_MAX: usize = 30;
pub const ROLLING_WINDOW_DEFAULT: usize = 12;

pub const SEASONAL_PERIOD_MIN: usize = 2;
pub const SEASONAL_PERIOD_MAX: usize = 365;
pub const SEASONAL_PERIOD_DEFAULT: usize = 12;

pub const ACF_LAGS_MIN: usize = 1;
pub const ACF_LAGS_MAX: usize = 200;
pub const ACF_LAGS_DEFAULT: usize = 30;

pub const FORECAST_PERIODS_MIN: u32 = 1;
pub const FORECAST_PERIODS_MAX: u32 = 365;
pub const CHANGEPOINT_PRIOR_MIN: f64 = 0.001;
pub const CHANGEPOINT_PRIOR_MAX: f64 = 0.5;
pub const SEASONALITY_PRIOR_MIN: f64 = 1.0;
pub const SEASONALITY_PRIOR_MAX: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnKind,
    pub dtype: String,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub filename: String,
    pub format: FileFormat,
    pub row_count: usize,
    pub columns: Vec<ColumnSummary>,
    pub preview: TablePreview,
}

fn default_window() -> usize {
    ROLLING_WINDOW_DEFAULT
}

fn default_period() -> usize {
    SEASONAL_PERIOD_DEFAULT
}

fn default_lags() -> usize {
    ACF_LAGS_DEFAULT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlotRequest {
    Line,
    RollingMeanStd {
        #[serde(default = "default_window")]
        window: usize,
    },
    Decomposition {
        #[serde(default = "default_period")]
        period: usize,
        #[serde(default)]
        model: DecompositionModel,
    },
    BoxplotByMonth,
    Autocorrelation {
        #[serde(default = "default_lags")]
        lags: usize,
    },
}

impl PlotRequest {
    pub fn kind(&self) -> PlotKind {
        match self {
            Self::Line => PlotKind::Line,
            Self::RollingMeanStd { .. } => PlotKind::RollingMeanStd,
            Self::Decomposition { .. } => PlotKind::Decomposition,
            Self::BoxplotByMonth => PlotKind::BoxplotByMonth,
            Self::Autocorrelation { .. } => PlotKind::Autocorrelation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastParams {
    pub periods: u32,
    pub seasonality_mode: SeasonalityMode,
    pub yearly_seasonality: bool,
    pub weekly_seasonality: bool,
    pub daily_seasonality: bool,
    pub changepoint_prior_scale: f64,
    pub seasonality_prior_scale: f64,
    pub include_holidays: bool,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            periods: 30,
            seasonality_mode: SeasonalityMode::Additive,
            yearly_seasonality: true,
            weekly_seasonality: true,
            daily_seasonality: false,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            include_holidays: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub date_column: String,
    pub value_column: String,
    #[serde(default)]
    pub fill: FillStrategy,
    #[serde(default)]
    pub plot: Option<PlotRequest>,
    #[serde(default)]
    pub forecast: ForecastParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingReport {
    pub date_missing: usize,
    pub value_missing: usize,
    /// `None` when nothing was missing and no repair was offered.
    pub strategy: Option<FillStrategy>,
    pub rows_before: usize,
    pub rows_after: usize,
    pub remaining_date_missing: usize,
    pub remaining_value_missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trace {
    Line {
        name: String,
        x: Vec<NaiveDateTime>,
        y: Vec<Option<f64>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Stem {
        name: String,
        x: Vec<u32>,
        y: Vec<f64>,
    },
    Band {
        name: String,
        x: Vec<u32>,
        lower: Vec<f64>,
        upper: Vec<f64>,
    },
    Box {
        name: String,
        stats: BoxStats,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_title: Option<String>,
    pub traces: Vec<Trace>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub kind: PlotKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
    pub panels: Vec<Panel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProphetRow {
    pub ds: NaiveDateTime,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSetup {
    pub params: ForecastParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    pub history: Vec<ProphetRow>,
    pub future: Vec<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub default: f64,
    pub min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotDescriptor {
    pub kind: PlotKind,
    pub label: String,
    pub parameters: Vec<ParameterSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub run_id: Uuid,
    pub overview: DatasetOverview,
    pub date_column: String,
    pub value_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<MissingReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prophet_preview: Option<TablePreview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub figure: Option<Figure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<ForecastSetup>,
    pub notices: Vec<Notice>,
}
