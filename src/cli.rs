//! Command-line options and logging setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::api::{ApiConfig, DEFAULT_BASE_URL};
use crate::error::{AppError, Context, Result};

#[derive(Parser, Debug, Clone)]
#[command(name = "userdesk", version, about = "View and edit users held by a REST service")]
pub struct Cli {
    /// Base URL of the users service (the collection lives at `<url>/users`)
    #[arg(long, env = "USERDESK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request timeout in seconds (none by default)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Theme file, created with defaults when missing
    #[arg(long, default_value = "theme.conf")]
    pub theme: PathBuf,

    /// Keybindings file, created with defaults when missing
    #[arg(long, default_value = "keybinds.conf")]
    pub keybinds: PathBuf,

    /// Write logs here (filtered by RUST_LOG). Nothing is logged otherwise.
    #[arg(long, env = "USERDESK_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.base_url.clone()).with_timeout(self.timeout_secs.map(Duration::from_secs))
    }
}

/// Install a file-backed subscriber; the terminal is owned by the UI.
pub fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_ctx(|| format!("open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("userdesk=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}
