//! Async traits at the persistence and generation seams.

use async_trait::async_trait;
use storybook_core::{
    Book, BookPatch, BookSummary, BookUpdate, ImageEngine, ImageResult, ListQuery, SharedSettings,
    StoryDraft, StoryRequest,
};
use storybook_error::StorybookResult;

/// Durable storage of books and their pages.
///
/// Implementations must make `create_book`, `update_book` with pages and the
/// delete operations atomic: either every row changes or none does.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Store a new book and all of its pages.
    ///
    /// Fails with a validation error on non-positive or duplicate page numbers.
    async fn create_book(&self, book: &Book) -> StorybookResult<String>;

    /// List books without pages, in the resolved sort order.
    async fn list_books(&self, query: &ListQuery) -> StorybookResult<Vec<BookSummary>>;

    /// Fetch one book with pages ascending by page number.
    ///
    /// An absent book is a not-found error.
    async fn get_book(&self, id: &str) -> StorybookResult<Book>;

    /// Replace the descriptive fields of a book.
    async fn replace_book(&self, id: &str, update: &BookUpdate) -> StorybookResult<Book>;

    /// Apply a partial update; absent fields keep their stored values.
    async fn update_book(&self, id: &str, patch: &BookPatch) -> StorybookResult<Book>;

    /// Remove a book and its pages. Removing an absent book succeeds.
    async fn delete_book(&self, id: &str) -> StorybookResult<()>;

    /// Remove every book; returns how many were removed.
    async fn delete_all_books(&self) -> StorybookResult<usize>;
}

/// Storage of the single process-wide settings record.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load the record, if one has been saved.
    async fn load_shared(&self) -> StorybookResult<Option<SharedSettings>>;

    /// Insert or overwrite the record.
    async fn save_shared(&self, settings: &SharedSettings) -> StorybookResult<()>;
}

/// Turns a wizard request into a validated story draft.
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Draft a title and pages.
    async fn generate_story(&self, request: &StoryRequest) -> StorybookResult<StoryDraft>;
}

/// Produces one illustration from a prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate an image for `prompt`.
    async fn generate(&self, prompt: &str) -> StorybookResult<ImageResult>;

    /// Engine backing this generator.
    fn engine(&self) -> ImageEngine;
}
