//! Error types for the HTTP server.

/// Error kinds for server operations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum ServerErrorKind {
    /// Failed to bind the listener
    #[display("Failed to bind {}", _0)]
    Bind(String),

    /// The server loop exited with an error
    #[display("Server error: {}", _0)]
    Serve(String),
}

/// Error wrapper with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Server Error: {} at line {} in {}", kind, line, file)]
pub struct ServerError {
    /// The error kind
    pub kind: ServerErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl ServerError {
    /// Create a new ServerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ServerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
