use std::path::Path;

use anyhow::Context;
use config::{Config, Environment, File, FileFormat, Map};
use serde::Deserialize;
use studio_api::{AnalysisLimits, DEFAULT_MAX_ROWS};

const CONFIG_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_bind: String,
    pub max_upload_bytes: usize,
    pub preview_rows: usize,
    pub max_rows: usize,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8501".into(),
            max_upload_bytes: 200 * 1024 * 1024,
            preview_rows: shared::protocol::DEFAULT_PREVIEW_ROWS,
            max_rows: DEFAULT_MAX_ROWS,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn limits(&self) -> AnalysisLimits {
        AnalysisLimits {
            preview_rows: self.preview_rows,
            max_rows: self.max_rows,
        }
    }
}

/// Defaults, then `server.toml` in the working directory, then the legacy
/// `SERVER_BIND` variable, then `APP__*` variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(CONFIG_FILE), std::env::vars())
}

pub fn load_settings_from(
    path: &Path,
    vars: impl IntoIterator<Item = (String, String)>,
) -> anyhow::Result<Settings> {
    let mut legacy = Map::new();
    let mut app = Map::new();
    for (key, value) in vars {
        if key == "SERVER_BIND" {
            legacy.insert(key, value);
        } else if key.starts_with("APP__") {
            app.insert(key, value);
        }
    }

    let settings = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(false))
        .add_source(Environment::default().source(Some(legacy)))
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true)
                .source(Some(app)),
        )
        .build()
        .with_context(|| format!("failed to read settings from '{}'", path.display()))?
        .try_deserialize::<Settings>()
        .context("invalid server settings")?;

    if settings.max_upload_bytes == 0 || settings.preview_rows == 0 || settings.max_rows == 0 {
        anyhow::bail!("upload and row limits must be positive");
    }
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
