//! Logging subscriber initialisation.

use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
};

use crate::config::{Config, LogFormat};

/// Install the global `tracing` subscriber described by `config`.
///
/// Logs go to stderr so stdout only carries the receipt.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(config: &Config) -> Result<(), TryInitError> {
    match config.log_format {
        LogFormat::Compact => init_with_layer(
            config,
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_writer(std::io::stderr),
        ),
        LogFormat::Json => init_with_layer(
            config,
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .with_writer(std::io::stderr),
        ),
    }
}

fn build_env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_new(&config.log_level).unwrap_or_else(|_err| EnvFilter::new("warn"))
}

fn init_with_layer<L>(config: &Config, fmt_layer: L) -> Result<(), TryInitError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(build_env_filter(config))
        .try_init()
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn invalid_log_level_falls_back_to_warn() -> TestResult {
        let config = Config::try_parse_from(["dayone", "--log-level", "info,dayone=bogus"])?;

        assert_eq!(build_env_filter(&config).to_string(), "warn");

        Ok(())
    }

    #[test]
    fn log_level_becomes_filter() -> TestResult {
        let config = Config::try_parse_from(["dayone", "--log-level", "debug"])?;

        assert_eq!(build_env_filter(&config).to_string(), "debug");

        Ok(())
    }
}
