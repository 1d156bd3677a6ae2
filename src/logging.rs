//! Subscriber setup for the command-line front end.

use crate::config::LoggingConfig;
use crate::{Result, SequencerError};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level; `verbose` raises the
/// configured level to `debug`. Output goes to stderr so note paths
/// printed on stdout stay scriptable.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| SequencerError::Internal(format!("invalid log level '{}': {}", level, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.format.as_str() {
        "json" => builder.json().try_init(),
        "pretty" => builder.pretty().try_init(),
        _ => builder.compact().try_init(),
    };

    installed.map_err(|e| SequencerError::Internal(format!("failed to install logger: {}", e)))
}
