//! Logging setup.
//!
//! The library only emits `tracing` events; binaries call [`init`] once.
//! `RUST_LOG` takes precedence over the level passed in.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{EncarteError, Result};

/// Filter used when neither `RUST_LOG` nor a level is given.
pub const DEFAULT_LEVEL: &str = "info";

/// Build the filter: `RUST_LOG` if set and valid, otherwise `level`.
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| EncarteError::Config(format!("invalid log level '{}': {}", level, e)))
}

/// Install a console subscriber writing to stderr.
pub fn init(level: &str) -> Result<()> {
    let filter = env_filter(level)?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .map_err(|e| EncarteError::Config(format!("logger already initialised: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_directives() {
        assert!(EnvFilter::try_new("encarte=debug,tower_http=info").is_ok());
        assert!(env_filter(DEFAULT_LEVEL).is_ok());
    }
}
