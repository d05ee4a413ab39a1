//! Tracing subscriber setup.

use serde::{Deserialize, Serialize};
use storybook_error::{ConfigError, ConfigErrorKind, StorybookResult};
use tracing_subscriber::{
    EnvFilter,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

fn default_level() -> String {
    "info".to_string()
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset (e.g. "info", "storybook_server=debug")
    #[serde(default = "default_level")]
    pub level: String,
    /// JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
///
/// # Errors
///
/// Fails on an invalid filter or when a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> StorybookResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| {
            ConfigError::new(ConfigErrorKind::Logging(format!(
                "invalid filter '{}': {}",
                config.level, e
            )))
        })?;

    let fmt_layer = if config.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::new(ConfigErrorKind::Logging(e.to_string())))?;

    Ok(())
}
