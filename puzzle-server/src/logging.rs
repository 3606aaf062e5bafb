//! Tracing subscriber setup

use crate::config::Config;
use crate::error::ServerError;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber; `RUST_LOG` overrides `--log-level`
pub fn init(config: &Config) -> Result<(), ServerError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| ServerError::Logging(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| ServerError::Logging(e.to_string()))
}
