//! Top-level error wrapper types.

use crate::{
    ConfigError, DatabaseError, DatabaseErrorKind, GenerationError, HttpError, JsonError,
    ProviderError, ProviderErrorKind, RetryableError, ServerError, StorageError, ValidationError,
};

/// Every error condition the workspace can surface.
///
/// # Examples
///
/// ```
/// use storybook_error::{StorybookError, HttpError};
///
/// let http_err = HttpError::unreachable("Connection failed");
/// let err: StorybookError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StorybookErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Database error
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Text or image provider error
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Generation pipeline error
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Rejected input
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Local settings storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// HTTP server error
    #[from(ServerError)]
    Server(ServerError),
}

/// Storybook error with kind discrimination.
///
/// # Examples
///
/// ```
/// use storybook_error::{StorybookResult, ConfigError, ConfigErrorKind};
///
/// fn might_fail() -> StorybookResult<()> {
///     Err(ConfigError::new(ConfigErrorKind::Missing("bind_address".into())))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storybook Error: {}", _0)]
pub struct StorybookError(Box<StorybookErrorKind>);

impl StorybookError {
    /// Create a new error from a kind.
    pub fn new(kind: StorybookErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StorybookErrorKind {
        &self.0
    }

    /// True when the error means "the requested record does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind(),
            StorybookErrorKind::Database(DatabaseError {
                kind: DatabaseErrorKind::NotFound,
                ..
            })
        )
    }

    /// The provider error kind, when this is a provider failure.
    pub fn provider_kind(&self) -> Option<&ProviderErrorKind> {
        match self.kind() {
            StorybookErrorKind::Provider(e) => Some(&e.kind),
            _ => None,
        }
    }

    /// Message suitable for a caller, without source location.
    ///
    /// # Examples
    ///
    /// ```
    /// use storybook_error::{StorybookError, ValidationError};
    ///
    /// let err: StorybookError = ValidationError::new("duplicate page 3").into();
    /// assert_eq!(err.message(), "duplicate page 3");
    /// ```
    pub fn message(&self) -> String {
        match self.kind() {
            StorybookErrorKind::Http(e) => e.kind.to_string(),
            StorybookErrorKind::Json(e) => e.kind.to_string(),
            StorybookErrorKind::Config(e) => e.kind.to_string(),
            StorybookErrorKind::Database(e) => e.kind.to_string(),
            StorybookErrorKind::Provider(e) => e.kind.to_string(),
            StorybookErrorKind::Generation(e) => e.kind.to_string(),
            StorybookErrorKind::Validation(e) => e.message.clone(),
            StorybookErrorKind::Storage(e) => e.kind.to_string(),
            StorybookErrorKind::Server(e) => e.kind.to_string(),
        }
    }
}

impl RetryableError for StorybookError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            StorybookErrorKind::Provider(e) => e.is_retryable(),
            _ => false,
        }
    }
}

// Generic From implementation for any type that converts to StorybookErrorKind
impl<T> From<T> for StorybookError
where
    T: Into<StorybookErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Storybook operations.
pub type StorybookResult<T> = std::result::Result<T, StorybookError>;
