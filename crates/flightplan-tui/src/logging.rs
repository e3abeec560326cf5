use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "flightplan=info,flightplan_core=info";

/// Send tracing output to a log file; the terminal belongs to the UI.
pub fn init() -> Result<PathBuf> {
    let log_dir = dirs::data_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?
        .join("flightplan");
    fs::create_dir_all(&log_dir)?;

    let log_path = log_dir.join("flightplan.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(log_path)
}
