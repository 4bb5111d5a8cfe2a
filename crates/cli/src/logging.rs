//! Tracing subscriber setup

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable consulted when no filter is given on the command line
pub const LOG_ENV: &str = "ORDO_LOG";

const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

pub struct LoggingConfig {
    pub filter: Option<String>,
    pub format: LogFormat,
}

impl LoggingConfig {
    fn filter(&self) -> String {
        self.filter
            .clone()
            .or_else(|| std::env::var(LOG_ENV).ok())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }
}

fn build_filter(spec: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(spec).with_context(|| format!("Invalid log filter '{}'", spec))
}

/// Install the global subscriber. Logs go to stderr so task output on stdout
/// stays readable.
pub fn init(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.filter())?;

    match config.format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
    .context("Failed to initialize tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_filter_is_accepted() {
        assert!(build_filter("ordo_core=debug,warn").is_ok());
    }

    #[test]
    fn test_malformed_filter_is_an_error() {
        let err = build_filter("ordo_core=loud").unwrap_err();
        assert!(err.to_string().contains("Invalid log filter 'ordo_core=loud'"));
    }

    #[test]
    fn test_explicit_filter_wins_over_default() {
        let config = LoggingConfig {
            filter: Some("info".to_string()),
            format: LogFormat::Compact,
        };
        assert_eq!(config.filter(), "info");
    }
}
