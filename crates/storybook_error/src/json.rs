//! Encoding and decoding failures of JSON payloads exchanged with the server.

/// Direction of the failed conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum JsonErrorKind {
    /// A value could not be written as JSON
    #[display("Failed to encode {}: {}", what, message)]
    Encode {
        /// What was being encoded
        what: String,
        /// serde_json's message
        message: String,
    },
    /// A payload did not match the expected shape
    #[display("Failed to decode {}: {}", what, message)]
    Decode {
        /// What was being decoded
        what: String,
        /// Parser message
        message: String,
    },
}

/// JSON conversion failure with source location.
///
/// # Examples
///
/// ```
/// use storybook_error::JsonError;
///
/// let err = JsonError::decode("book", "missing field `title`");
/// assert_eq!(err.kind.to_string(), "Failed to decode book: missing field `title`");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} at line {} in {}", kind, line, file)]
pub struct JsonError {
    /// Which conversion failed
    pub kind: JsonErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Error of `kind` at the caller's location.
    #[track_caller]
    pub fn new(kind: JsonErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Encoding `what` failed.
    #[track_caller]
    pub fn encode(what: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::new(JsonErrorKind::Encode {
            what: what.into(),
            message: message.to_string(),
        })
    }

    /// Decoding `what` failed.
    #[track_caller]
    pub fn decode(what: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::new(JsonErrorKind::Decode {
            what: what.into(),
            message: message.to_string(),
        })
    }
}
