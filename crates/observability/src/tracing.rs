//! Tracing/logging initialization.
//!
//! `RUST_LOG` selects the filter (default `info`), `LOG_FORMAT` the output: `json`
//! (default) or `text`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value; unknown values fall back to JSON.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" | "plain" => LogFormat::Text,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub filter: String,
    pub format: LogFormat,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Json,
        }
    }
}

impl TracingConfig {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("RUST_LOG").ok().as_deref(),
            std::env::var("LOG_FORMAT").ok().as_deref(),
        )
    }

    fn from_vars(rust_log: Option<&str>, log_format: Option<&str>) -> Self {
        let filter = rust_log
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_FILTER)
            .to_string();
        let format = log_format.map(LogFormat::parse).unwrap_or_default();
        Self { filter, format }
    }
}

/// Install the global subscriber. Subsequent calls are no-ops.
pub fn init(config: &TracingConfig) {
    let filter =
        EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    if installed.is_ok() {
        ::tracing::debug!(filter = %config.filter, format = ?config.format, "tracing initialized");
    }
}
