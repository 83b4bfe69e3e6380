//! Command-line and environment configuration

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "juicebox-rs")]
#[command(about = "Terminal remote control for a Juicebox media daemon", long_about = None)]
pub struct Config {
    /// Base URL of the daemon's REST API
    #[arg(long, env = "JUICEBOX_URL", default_value = "http://127.0.0.1:3000")]
    pub server_url: String,

    /// How often the player status is polled, in milliseconds
    #[arg(long, env = "JUICEBOX_POLL_MS", default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, env = "JUICEBOX_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Seconds skipped by the seek keys
    #[arg(long, env = "JUICEBOX_SEEK_STEP", default_value_t = 10)]
    pub seek_step_secs: u32,

    /// Directory for the daily log files
    #[arg(long, env = "JUICEBOX_LOG_DIR", default_value = ".logs")]
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".to_string(),
            poll_interval_ms: 1000,
            timeout_secs: 10,
            seek_step_secs: 10,
            log_dir: PathBuf::from(".logs"),
        }
    }
}

impl Config {
    /// Parse from the process arguments and environment, then validate.
    pub fn load() -> Result<Self> {
        Self::parse().validated()
    }

    /// Check ranges and normalize the server URL.
    pub fn validated(mut self) -> Result<Self> {
        let url = self.server_url.trim().trim_end_matches('/').to_string();
        if url.is_empty() {
            bail!("Server URL cannot be empty");
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!("Server URL must start with http:// or https://, got {}", url);
        }
        reqwest::Url::parse(&url)?;
        self.server_url = url;

        if self.poll_interval_ms == 0 {
            bail!("Poll interval must be greater than zero");
        }
        if self.timeout_secs == 0 {
            bail!("Request timeout must be greater than zero");
        }
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
