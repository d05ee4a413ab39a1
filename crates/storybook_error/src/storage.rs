//! Local settings storage error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to read file
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// Writing the value would exceed the store's byte quota
    #[display("Storage quota exceeded: {} bytes needed, {} allowed", needed, quota)]
    QuotaExceeded {
        /// Bytes the store would hold after the write
        needed: usize,
        /// Configured quota in bytes
        quota: usize,
    },
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use storybook_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::QuotaExceeded { needed: 10, quota: 5 });
/// assert!(format!("{}", err).contains("quota"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
