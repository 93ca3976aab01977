//! Logging setup
//!
//! Installs a global `tracing-subscriber` fmt subscriber. Filter directives
//! come from `KINEPONG_LOG`, then `RUST_LOG`, then the configured filter.

use tracing_subscriber::EnvFilter;

use kinepong_core::{KinepongError, KinepongResult};

use crate::{LoggingConfig, ENV_LOG};

/// Pick the directives to use. The first non-empty source wins.
pub fn filter_directives(
    config: &LoggingConfig,
    kinepong_log: Option<String>,
    rust_log: Option<String>,
) -> String {
    [kinepong_log, rust_log]
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.filter.clone())
}

/// Build the filter for `config` using the process environment
pub fn build_filter(config: &LoggingConfig) -> KinepongResult<EnvFilter> {
    let directives = filter_directives(
        config,
        std::env::var(ENV_LOG).ok(),
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
    );
    EnvFilter::try_new(&directives)
        .map_err(|e| KinepongError::Logging(format!("bad filter {directives:?}: {e}")))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> KinepongResult<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| KinepongError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_precedence() {
        let config = LoggingConfig {
            filter: "warn".into(),
            json: false,
        };
        assert_eq!(filter_directives(&config, None, None), "warn");
        assert_eq!(
            filter_directives(&config, None, Some("debug".into())),
            "debug"
        );
        assert_eq!(
            filter_directives(&config, Some("kinepong_runtime=trace".into()), Some("debug".into())),
            "kinepong_runtime=trace"
        );
        assert_eq!(filter_directives(&config, Some("  ".into()), None), "warn");
    }

    #[test]
    fn test_init_twice_fails() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config);
        assert!(matches!(init_logging(&config), Err(KinepongError::Logging(_))));
    }
}
