//! Errors from the HTTP client of a Storybook server.

/// Ways a call to the server can fail outside the mapped statuses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum HttpErrorKind {
    /// No response arrived
    #[display("Server unreachable: {}", _0)]
    Unreachable(String),
    /// The server answered with an error status
    #[display("Server returned HTTP {}: {}", status, message)]
    Status {
        /// Response status
        status: u16,
        /// `error` field of the response body, or the status text
        message: String,
    },
}

/// Server call failure with source location.
///
/// # Examples
///
/// ```
/// use storybook_error::HttpError;
///
/// let err = HttpError::status(503, "database unavailable");
/// assert_eq!(err.status_code(), Some(503));
///
/// let err = HttpError::unreachable("connection refused");
/// assert_eq!(err.status_code(), None);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("HTTP Error: {} at line {} in {}", kind, line, file)]
pub struct HttpError {
    /// What went wrong
    pub kind: HttpErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl HttpError {
    /// Error of `kind` at the caller's location.
    #[track_caller]
    pub fn new(kind: HttpErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// The request never got a response.
    #[track_caller]
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::Unreachable(message.into()))
    }

    /// The server answered `status` with `message`.
    #[track_caller]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::Status {
            status,
            message: message.into(),
        })
    }

    /// Response status, when a response arrived.
    pub fn status_code(&self) -> Option<u16> {
        match &self.kind {
            HttpErrorKind::Status { status, .. } => Some(*status),
            HttpErrorKind::Unreachable(_) => None,
        }
    }
}
