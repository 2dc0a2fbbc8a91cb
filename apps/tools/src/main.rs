use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use shared::{
    domain::{DecompositionModel, FillStrategy},
    error::{ApiError, ApiException},
    protocol::{
        AnalyzeRequest, ForecastParams, PlotRequest, ACF_LAGS_DEFAULT, ROLLING_WINDOW_DEFAULT,
        SEASONAL_PERIOD_DEFAULT,
    },
};
use studio_api::{analyze, forecast_defaults, inspect_dataset, AnalysisLimits, ApiContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Runs the analysis pipeline on a local file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Rows shown in table previews.
    #[arg(long, default_value_t = shared::protocol::DEFAULT_PREVIEW_ROWS)]
    preview_rows: usize,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the dataset overview as JSON.
    Inspect {
        file: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run the full pipeline and print the response as JSON.
    Analyze {
        file: PathBuf,
        #[arg(long)]
        date_column: String,
        #[arg(long)]
        value_column: String,
        #[arg(long, value_enum, default_value_t = FillArg::DoNothing)]
        fill: FillArg,
        #[arg(long, value_enum)]
        plot: Option<PlotArg>,
        #[arg(long, default_value_t = ROLLING_WINDOW_DEFAULT)]
        window: usize,
        #[arg(long, default_value_t = SEASONAL_PERIOD_DEFAULT)]
        period: usize,
        #[arg(long, value_enum, default_value_t = ModelArg::Additive)]
        model: ModelArg,
        #[arg(long, default_value_t = ACF_LAGS_DEFAULT)]
        lags: usize,
        /// TOML file with forecast parameters; missing keys keep their defaults.
        #[arg(long)]
        params: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the default forecast parameters as TOML.
    Defaults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FillArg {
    DoNothing,
    DropRows,
    ForwardFill,
    BackwardFill,
}

impl From<FillArg> for FillStrategy {
    fn from(value: FillArg) -> Self {
        match value {
            FillArg::DoNothing => FillStrategy::DoNothing,
            FillArg::DropRows => FillStrategy::DropRows,
            FillArg::ForwardFill => FillStrategy::ForwardFill,
            FillArg::BackwardFill => FillStrategy::BackwardFill,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PlotArg {
    Line,
    Rolling,
    Decomposition,
    Boxplot,
    Acf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModelArg {
    Additive,
    Multiplicative,
}

fn plot_request(
    plot: PlotArg,
    window: usize,
    period: usize,
    model: ModelArg,
    lags: usize,
) -> PlotRequest {
    match plot {
        PlotArg::Line => PlotRequest::Line,
        PlotArg::Rolling => PlotRequest::RollingMeanStd { window },
        PlotArg::Decomposition => PlotRequest::Decomposition {
            period,
            model: match model {
                ModelArg::Additive => DecompositionModel::Additive,
                ModelArg::Multiplicative => DecompositionModel::Multiplicative,
            },
        },
        PlotArg::Boxplot => PlotRequest::BoxplotByMonth,
        PlotArg::Acf => PlotRequest::Autocorrelation { lags },
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = run(cli)?;
    if let Some(text) = output {
        println!("{text}");
    }
    Ok(())
}

/// Executes a command; returns the text to print when no output file was given.
fn run(cli: Cli) -> Result<Option<String>> {
    let ctx = ApiContext::new(AnalysisLimits {
        preview_rows: cli.preview_rows,
        ..AnalysisLimits::default()
    });

    match cli.command {
        Command::Inspect { file, out } => {
            let (filename, bytes) = read_input(&file)?;
            let overview = inspect_dataset(&ctx, &filename, &bytes).map_err(api_error)?;
            emit(&overview, out.as_deref())
        }
        Command::Analyze {
            file,
            date_column,
            value_column,
            fill,
            plot,
            window,
            period,
            model,
            lags,
            params,
            out,
        } => {
            let forecast = match params {
                Some(path) => load_params(&path)?,
                None => forecast_defaults(),
            };
            let request = AnalyzeRequest {
                date_column,
                value_column,
                fill: fill.into(),
                plot: plot.map(|p| plot_request(p, window, period, model, lags)),
                forecast,
            };
            let (filename, bytes) = read_input(&file)?;
            let response = analyze(&ctx, &filename, &bytes, &request).map_err(api_error)?;
            info!(
                run_id = %response.run_id,
                notices = response.notices.len(),
                "analysis complete"
            );
            emit(&response, out.as_deref())
        }
        Command::Defaults => Ok(Some(toml::to_string(&forecast_defaults())?)),
    }
}

fn read_input(path: &Path) -> Result<(String, Vec<u8>)> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("'{}' is not a file path", path.display()))?;
    let bytes = fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))?;
    Ok((filename, bytes))
}

fn load_params(path: &Path) -> Result<ForecastParams> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read parameters from '{}'", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid parameters in '{}'", path.display()))
}

fn emit<T: Serialize>(value: &T, out: Option<&Path>) -> Result<Option<String>> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write '{}'", path.display()))?;
            Ok(None)
        }
        None => Ok(Some(json)),
    }
}

fn api_error(err: ApiError) -> anyhow::Error {
    ApiException::from(err).into()
}
