//! File logging for the TUI
//!
//! The terminal belongs to ratatui, so every event goes to a daily file
//! under the configured log directory instead of stdout.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "juicebox-rs";
const DEFAULT_FILTER: &str = "juicebox_rs=debug,reqwest=info,warn";

/// `RUST_LOG` wins over the built-in default.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Start writing `<log_dir>/juicebox-rs.YYYY-MM-DD.log`.
///
/// Keep the returned guard alive for as long as the app logs; dropping it
/// flushes what is still buffered.
pub fn init_logging(config: &Config) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(&config.log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(
        log_dir = %config.log_dir.display(),
        server = %config.server_url,
        poll_ms = config.poll_interval_ms,
        timeout_secs = config.timeout_secs,
        "Logging initialized"
    );

    Ok(guard)
}

/// Log a daemon command and its result
#[macro_export]
macro_rules! log_api_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::info!(operation = $operation, "API request successful"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "API request failed"),
        }
    };
}

/// Log a daemon request with additional context
#[macro_export]
macro_rules! log_api_request {
    ($operation:expr, $($field:tt)*) => {
        tracing::debug!(operation = $operation, $($field)*, "API request started");
    };
}
