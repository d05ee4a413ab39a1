//! In-memory repositories for tests and database-less servers.
//!
//! Semantics match the PostgreSQL repositories: server-assigned creation
//! timestamps, allow-listed sorting, coalescing partial updates and
//! idempotent deletes. All data is lost when the repository is dropped.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use storybook_core::{
    Book, BookPatch, BookSummary, BookUpdate, ListQuery, SharedSettings, SortKey, SortOrder,
    validate_page_numbers,
};
use storybook_error::{DatabaseError, DatabaseErrorKind, StorybookResult, ValidationError};
use storybook_interface::{BookRepository, SettingsRepository};
use tokio::sync::RwLock;

/// Books held in a `HashMap` behind an `RwLock`.
///
/// # Example
///
/// ```
/// use storybook_database::InMemoryBookRepository;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let repo = InMemoryBookRepository::new();
/// assert!(repo.is_empty().await);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookRepository {
    books: Arc<RwLock<HashMap<String, Book>>>,
}

impl InMemoryBookRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored books.
    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    /// True when no books are stored.
    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }
}

fn compare(a: &Book, b: &Book, key: SortKey) -> std::cmp::Ordering {
    match key {
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::Title => a.title.cmp(&b.title),
        SortKey::Theme => a.theme.cmp(&b.theme),
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn create_book(&self, book: &Book) -> StorybookResult<String> {
        book.validate_pages().map_err(ValidationError::new)?;

        let mut books = self.books.write().await;
        if books.contains_key(&book.id) {
            return Err(DatabaseError::new(DatabaseErrorKind::Query(format!(
                "duplicate key value violates unique constraint: book {}",
                book.id
            )))
            .into());
        }

        let mut stored = book.clone();
        stored.created_at = Some(Utc::now());
        stored.sort_pages();
        books.insert(stored.id.clone(), stored);
        Ok(book.id.clone())
    }

    async fn list_books(&self, query: &ListQuery) -> StorybookResult<Vec<BookSummary>> {
        let (key, order) = query.resolve();
        let books = self.books.read().await;
        let mut listed: Vec<&Book> = books.values().collect();
        listed.sort_by(|a, b| match order {
            SortOrder::Asc => compare(a, b, key),
            SortOrder::Desc => compare(b, a, key),
        });
        Ok(listed.into_iter().map(Book::summary).collect())
    }

    async fn get_book(&self, id: &str) -> StorybookResult<Book> {
        self.books
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found().into())
    }

    async fn replace_book(&self, id: &str, update: &BookUpdate) -> StorybookResult<Book> {
        let mut books = self.books.write().await;
        let book = books.get_mut(id).ok_or_else(DatabaseError::not_found)?;
        book.title = update.title.clone();
        book.theme = update.theme.clone();
        book.target_age = update.target_age.clone();
        book.moral_value = update.moral_value.clone();
        Ok(book.clone())
    }

    async fn update_book(&self, id: &str, patch: &BookPatch) -> StorybookResult<Book> {
        if let Some(pages) = &patch.pages {
            validate_page_numbers(pages).map_err(ValidationError::new)?;
        }
        let mut books = self.books.write().await;
        let book = books.get_mut(id).ok_or_else(DatabaseError::not_found)?;
        patch.apply_to(book);
        Ok(book.clone())
    }

    async fn delete_book(&self, id: &str) -> StorybookResult<()> {
        self.books.write().await.remove(id);
        Ok(())
    }

    async fn delete_all_books(&self) -> StorybookResult<usize> {
        let mut books = self.books.write().await;
        let removed = books.len();
        books.clear();
        Ok(removed)
    }
}

/// Shared settings record held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySettingsRepository {
    record: Arc<RwLock<Option<SharedSettings>>>,
}

impl InMemorySettingsRepository {
    /// Create a repository with no saved record.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn load_shared(&self) -> StorybookResult<Option<SharedSettings>> {
        Ok(self.record.read().await.clone())
    }

    async fn save_shared(&self, settings: &SharedSettings) -> StorybookResult<()> {
        *self.record.write().await = Some(settings.clone());
        Ok(())
    }
}
