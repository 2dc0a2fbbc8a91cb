use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    /// Detects the format from an upload file name, ignoring case.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.trim().to_ascii_lowercase();
        if lower.ends_with(".csv") {
            Some(Self::Csv)
        } else if lower.ends_with(".xlsx") {
            Some(Self::Xlsx)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Datetime,
    Text,
}

impl ColumnKind {
    /// Label shown in the "column names & types" view.
    pub fn dtype_label(self) -> &'static str {
        match self {
            Self::Integer => "int64",
            Self::Float => "float64",
            Self::Boolean => "bool",
            Self::Datetime => "datetime64[ns]",
            Self::Text => "object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    #[default]
    DoNothing,
    DropRows,
    ForwardFill,
    BackwardFill,
}

impl FillStrategy {
    pub fn label(self) -> &'static str {
        match self {
            Self::DoNothing => "Do nothing",
            Self::DropRows => "Drop rows",
            Self::ForwardFill => "Forward fill",
            Self::BackwardFill => "Backward fill",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    Line,
    RollingMeanStd,
    Decomposition,
    BoxplotByMonth,
    Autocorrelation,
}

impl PlotKind {
    pub const ALL: [PlotKind; 5] = [
        PlotKind::Line,
        PlotKind::RollingMeanStd,
        PlotKind::Decomposition,
        PlotKind::BoxplotByMonth,
        PlotKind::Autocorrelation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Line => "Line Plot",
            Self::RollingMeanStd => "Rolling Mean & Std",
            Self::Decomposition => "Decomposition Plot",
            Self::BoxplotByMonth => "Boxplot by Month",
            Self::Autocorrelation => "Autocorrelation Plot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalityMode {
    #[default]
    Additive,
    Multiplicative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecompositionModel {
    #[default]
    Additive,
    Multiplicative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
