//! Book generation error types.

/// Specific error conditions for the generation pipeline and editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GenerationErrorKind {
    /// The story payload was not valid JSON for the story schema
    #[display("Failed to decode story JSON: {}", _0)]
    MalformedStory(String),
    /// The decoded story violates a structural rule
    #[display("Invalid story draft: {}", _0)]
    InvalidDraft(String),
    /// An editor action needs an open book
    #[display("No book is currently open")]
    NoCurrentBook,
    /// The requested page does not exist in the open book
    #[display("Page {} not found in current book", _0)]
    PageNotFound(i32),
    /// A generation is already running in this session
    #[display("A book is already being generated")]
    AlreadyGenerating,
}

/// Error type for generation operations.
///
/// # Examples
///
/// ```
/// use storybook_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::NoCurrentBook);
/// assert!(format!("{}", err).contains("No book"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The specific error condition
    pub kind: GenerationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
