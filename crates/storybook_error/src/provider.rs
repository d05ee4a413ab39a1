//! Provider (text/image generation upstream) error types and retry classification.

/// Substring that upstream providers use when a key has been revoked after a leak.
const KEY_LEAK_MARKER: &str = "leaked";

/// Provider-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProviderErrorKind {
    /// No API key supplied by the caller or configured on the server
    #[display("{} API key not configured on server", _0)]
    MissingApiKey(String),
    /// The upstream provider revoked the key after detecting a leak
    #[display(
        "{} API key was reported as leaked and has been disabled. Create a new key and update it in settings.",
        _0
    )]
    KeyRevoked(String),
    /// Upstream returned a non-2xx status
    #[display("HTTP {} error: {}", status_code, message)]
    Upstream {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Transport failure before a response was received
    #[display("Network error: {}", _0)]
    Network(String),
    /// Response body did not have the expected shape
    #[display("Invalid provider response: {}", _0)]
    InvalidResponse(String),
    /// The model answered without any candidates
    #[display("Provider returned no candidates")]
    EmptyCandidates,
    /// The model answered without image data (carries the refusal text, if any)
    #[display("Model did not return image data: {}", _0)]
    NoImage(String),
}

impl ProviderErrorKind {
    /// Classify an upstream failure message.
    ///
    /// Messages that mention a leaked key become [`ProviderErrorKind::KeyRevoked`];
    /// everything else is an [`ProviderErrorKind::Upstream`] error with the original status.
    ///
    /// # Examples
    ///
    /// ```
    /// use storybook_error::ProviderErrorKind;
    ///
    /// let kind = ProviderErrorKind::from_upstream("Gemini", 403, "Your API key was reported as leaked.");
    /// assert_eq!(kind, ProviderErrorKind::KeyRevoked("Gemini".to_string()));
    ///
    /// let kind = ProviderErrorKind::from_upstream("Gemini", 429, "Quota exceeded");
    /// assert!(matches!(kind, ProviderErrorKind::Upstream { status_code: 429, .. }));
    /// ```
    pub fn from_upstream(provider: &str, status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if message.to_lowercase().contains(KEY_LEAK_MARKER) {
            ProviderErrorKind::KeyRevoked(provider.to_string())
        } else {
            ProviderErrorKind::Upstream {
                status_code,
                message,
            }
        }
    }

    /// Only transport failures are eligible for automatic retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderErrorKind::Network(_))
    }

    /// HTTP status to relay for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ProviderErrorKind::MissingApiKey(_) => 500,
            ProviderErrorKind::KeyRevoked(_) => 403,
            ProviderErrorKind::Upstream { status_code, .. } => *status_code,
            ProviderErrorKind::Network(_) => 502,
            ProviderErrorKind::InvalidResponse(_)
            | ProviderErrorKind::EmptyCandidates
            | ProviderErrorKind::NoImage(_) => 502,
        }
    }
}

/// Provider error with source location tracking.
///
/// # Examples
///
/// ```
/// use storybook_error::{ProviderError, ProviderErrorKind};
///
/// let err = ProviderError::new(ProviderErrorKind::MissingApiKey("Gemini".into()));
/// assert!(format!("{}", err).contains("not configured"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at line {} in {}", kind, line, file)]
pub struct ProviderError {
    /// The kind of error that occurred
    pub kind: ProviderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry logic.
///
/// # Examples
///
/// ```
/// use storybook_error::{ProviderError, ProviderErrorKind, RetryableError};
///
/// let err = ProviderError::new(ProviderErrorKind::Network("connection reset".into()));
/// assert!(err.is_retryable());
///
/// let err = ProviderError::new(ProviderErrorKind::Upstream {
///     status_code: 503,
///     message: "Service unavailable".to_string(),
/// });
/// assert!(!err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for ProviderError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
