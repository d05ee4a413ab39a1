//! Server configuration.
//!
//! Sources, later overriding earlier:
//! - built-in defaults
//! - `storybook.toml` in the working directory (or an explicit path)
//! - `STORYBOOK_`-prefixed environment variables (`__` separates nesting,
//!   e.g. `STORYBOOK_LOGGING__JSON=true`)
//! - command-line flags, applied by the binary
//!
//! Provider keys not set by any of these fall back to the conventional
//! `GEMINI_API_KEY`/`FREEPIK_API_KEY` variables and then to their
//! `VITE_`-prefixed variants.

use crate::LoggingConfig;
use config::{Config, Environment, File};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use storybook_database::DEFAULT_POOL_SIZE;
use storybook_error::{ConfigError, ConfigErrorKind, StorybookResult};
use storybook_models::{FREEPIK_API_BASE, GEMINI_API_BASE};
use tracing::{debug, instrument};

/// Default request body limit: 50 MiB, enough for books with inline images.
pub const DEFAULT_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Default listen address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Provider keys held by the server.
///
/// A key supplied by the caller always wins over these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyKeys {
    /// Gemini key
    #[serde(default)]
    pub gemini: Option<String>,
    /// Freepik key
    #[serde(default)]
    pub freepik: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ProxyKeys {
    /// Keys from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Keys from an arbitrary variable lookup.
    ///
    /// # Examples
    ///
    /// ```
    /// use storybook_server::ProxyKeys;
    ///
    /// let keys = ProxyKeys::from_lookup(|name| match name {
    ///     "GEMINI_API_KEY" => Some("".to_string()),
    ///     "VITE_GEMINI_API_KEY" => Some("browser-key".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(keys.gemini.as_deref(), Some("browser-key"));
    /// assert_eq!(keys.freepik, None);
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let first = |names: &[&str]| names.iter().find_map(|name| non_blank(lookup(name)));
        Self {
            gemini: first(&["GEMINI_API_KEY", "VITE_GEMINI_API_KEY"]),
            freepik: first(&["FREEPIK_API_KEY", "VITE_FREEPIK_API_KEY"]),
        }
    }

    /// Fill missing keys from `fallback`.
    pub fn or(self, fallback: ProxyKeys) -> Self {
        Self {
            gemini: non_blank(self.gemini).or(fallback.gemini),
            freepik: non_blank(self.freepik).or(fallback.freepik),
        }
    }

    /// The key to use for one request: the caller's, else the server's.
    ///
    /// Blank strings count as absent.
    pub fn resolve<'a>(caller: Option<&'a str>, server: Option<&'a str>) -> Option<&'a str> {
        caller
            .filter(|k| !k.trim().is_empty())
            .or(server.filter(|k| !k.trim().is_empty()))
    }
}

/// Base URLs of the upstream providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Gemini REST base
    #[serde(default = "default_gemini_base")]
    pub gemini_base_url: String,
    /// Freepik REST base
    #[serde(default = "default_freepik_base")]
    pub freepik_base_url: String,
}

fn default_gemini_base() -> String {
    GEMINI_API_BASE.to_string()
}

fn default_freepik_base() -> String {
    FREEPIK_API_BASE.to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            gemini_base_url: default_gemini_base(),
            freepik_base_url: default_freepik_base(),
        }
    }
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

fn default_pool_size() -> u32 {
    DEFAULT_POOL_SIZE
}

fn default_body_limit() -> usize {
    DEFAULT_BODY_LIMIT
}

/// Complete server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(default, setter(into))]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_bind_address")]
    bind_address: String,
    /// PostgreSQL URL (falls back to `DATABASE_URL`)
    #[serde(default)]
    database_url: Option<String>,
    /// Pooled connections
    #[serde(default = "default_pool_size")]
    pool_size: u32,
    /// Maximum request body in bytes
    #[serde(default = "default_body_limit")]
    body_limit: usize,
    /// Server-side provider keys
    #[serde(default)]
    keys: ProxyKeys,
    /// Upstream endpoints
    #[serde(default)]
    upstream: UpstreamConfig,
    /// Logging
    #[serde(default)]
    logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            database_url: None,
            pool_size: default_pool_size(),
            body_limit: default_body_limit(),
            keys: ProxyKeys::default(),
            upstream: UpstreamConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Creates a new builder.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Load configuration from `path` (or `./storybook.toml`) and the environment.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a source cannot be read or parsed.
    #[instrument]
    pub fn load(path: Option<&Path>) -> StorybookResult<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("storybook").required(false),
        };

        let config: ServerConfig = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("STORYBOOK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Invalid(e.to_string())))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Invalid(e.to_string())))?;

        let config = config.with_env_fallbacks();
        debug!(
            bind_address = %config.bind_address,
            database = config.database_url.is_some(),
            gemini_key = config.keys.gemini.is_some(),
            freepik_key = config.keys.freepik.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Fill the database URL and provider keys from conventional variables.
    pub fn with_env_fallbacks(self) -> Self {
        self.with_fallbacks(|name| std::env::var(name).ok())
    }

    /// [`ServerConfig::with_env_fallbacks`] over an arbitrary lookup.
    pub fn with_fallbacks(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if non_blank(self.database_url.clone()).is_none() {
            self.database_url = non_blank(lookup("DATABASE_URL"));
        }
        self.keys = self.keys.or(ProxyKeys::from_lookup(&lookup));
        self
    }

    /// Replace the listen address.
    pub fn with_bind_address(mut self, bind_address: impl Into<String>) -> Self {
        self.bind_address = bind_address.into();
        self
    }

    /// Replace the database URL.
    pub fn with_database_url(mut self, database_url: impl Into<String>) -> Self {
        self.database_url = Some(database_url.into());
        self
    }

    /// Switch to JSON log output.
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.logging.json = json;
        self
    }
}
