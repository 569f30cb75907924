use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;
use simplelog::{Config, WriteLogger};

use crate::config::DashboardConfig;

/// Send `log` output to the configured log file.
///
/// Returns the log file path. Fails if a global logger is already set.
pub fn init_logging(config: &DashboardConfig) -> Result<PathBuf> {
    let path = config.log_file();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let log_file = File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    WriteLogger::init(config.log_level_filter(), Config::default(), log_file)
        .context("Logger already initialized")?;
    info!("Sales dashboard logging started");
    Ok(path)
}
