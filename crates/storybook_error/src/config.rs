//! Server configuration failures.

/// What is wrong with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A required setting has no value
    #[display("{} is not configured", _0)]
    Missing(String),
    /// Sources could not be read or merged
    #[display("Invalid configuration: {}", _0)]
    Invalid(String),
    /// The log filter or subscriber could not be set up
    #[display("Logging setup failed: {}", _0)]
    Logging(String),
}

/// Configuration failure with source location.
///
/// Raised at startup, before the server accepts requests.
///
/// # Examples
///
/// ```
/// use storybook_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::Missing("DATABASE_URL".into()));
/// assert_eq!(err.kind.to_string(), "DATABASE_URL is not configured");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Error of `kind` at the caller's location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
