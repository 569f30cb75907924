use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Dashboard settings. Every field has a default, so a config file only
/// needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Prefix for monetary metrics
    pub currency_prefix: String,
    /// Significance level of the normality test
    pub normality_alpha: f64,
    /// Rows kept per chart payload
    pub max_chart_rows: usize,
    pub log_level: String,
    /// Defaults to `~/.sales-dashboard/dashboard.log`
    pub log_path: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            currency_prefix: "R$".to_string(),
            normality_alpha: 0.05,
            max_chart_rows: 50,
            log_level: "info".to_string(),
            log_path: None,
        }
    }
}

impl DashboardConfig {
    /// Parsed log level, `Info` when unrecognised
    pub fn log_level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_path.clone().unwrap_or_else(default_log_path)
    }
}

/// Get the path to the default config file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sales-dashboard/config.json")
}

pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sales-dashboard/dashboard.log")
}

/// Load config from a JSON file
pub fn load_config(path: &Path) -> Result<DashboardConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}

/// Load config from a JSON file, or defaults if the file does not exist
pub fn load_or_default(path: &Path) -> Result<DashboardConfig> {
    if !path.exists() {
        return Ok(DashboardConfig::default());
    }
    load_config(path)
}
