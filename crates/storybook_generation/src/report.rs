//! Pipeline phases and outcomes.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use storybook_core::Book;

/// Stage of a book generation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GenerationPhase {
    /// Waiting for the story draft
    Drafting,
    /// Generating page illustrations
    Illustrating,
    /// Building the book from draft and images
    Assembling,
    /// Saving the book
    Persisting,
    /// Saved
    Done,
}

/// A page whose illustration could not be generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFailure {
    /// Page number
    pub page_number: i32,
    /// Why the illustration failed
    pub message: String,
}

/// Result of a successful generation.
///
/// A book is produced even when some illustrations fail; those pages keep
/// their text and prompt and have no image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// The saved book
    book: Book,
    /// Pages left without an illustration
    failed_pages: Vec<PageFailure>,
}

impl GenerationReport {
    /// Report for `book` with the given failures.
    pub fn new(book: Book, failed_pages: Vec<PageFailure>) -> Self {
        Self { book, failed_pages }
    }

    /// True when at least one illustration failed.
    pub fn is_partial(&self) -> bool {
        !self.failed_pages.is_empty()
    }

    /// Takes the book out of the report.
    pub fn into_book(self) -> Book {
        self.book
    }
}
