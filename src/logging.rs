//! Tracing subscriber setup for applications embedding `SpeedMap`

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Build the level filter: `RUST_LOG` wins, otherwise the configured level.
#[must_use]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install a global fmt subscriber writing to stderr.
///
/// Returns `false` if a global subscriber was already set.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let builder = fmt()
        .with_env_filter(env_filter(config))
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    let installed = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };

    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_a_no_op() {
        let config = LoggingConfig::default();
        let _ = init_tracing(&config);
        assert!(!init_tracing(&config));
    }

    #[test]
    fn test_env_filter_uses_configured_level() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
        };
        let filter = env_filter(&config);
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(filter.to_string(), "debug");
        }
    }
}
