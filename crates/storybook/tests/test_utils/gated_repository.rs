//! Book repository whose deletes wait for a signal.

use async_trait::async_trait;
use std::sync::Arc;
use storybook::{
    Book, BookPatch, BookRepository, BookSummary, BookUpdate, DatabaseError, DatabaseErrorKind,
    ListQuery, StorybookResult,
};
use storybook_database::InMemoryBookRepository;
use tokio::sync::Notify;

/// In-memory repository whose deletes block until [`GatedRepository::release`].
#[derive(Clone)]
pub struct GatedRepository {
    inner: InMemoryBookRepository,
    gate: Arc<Notify>,
    fail_deletes: bool,
}

impl GatedRepository {
    /// Deletes succeed once released.
    pub fn new() -> Self {
        Self {
            inner: InMemoryBookRepository::new(),
            gate: Arc::new(Notify::new()),
            fail_deletes: false,
        }
    }

    /// Deletes fail once released.
    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::new()
        }
    }

    /// Let one pending delete proceed.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// Backing store.
    pub fn inner(&self) -> &InMemoryBookRepository {
        &self.inner
    }
}

#[async_trait]
impl BookRepository for GatedRepository {
    async fn create_book(&self, book: &Book) -> StorybookResult<String> {
        self.inner.create_book(book).await
    }

    async fn list_books(&self, query: &ListQuery) -> StorybookResult<Vec<BookSummary>> {
        self.inner.list_books(query).await
    }

    async fn get_book(&self, id: &str) -> StorybookResult<Book> {
        self.inner.get_book(id).await
    }

    async fn replace_book(&self, id: &str, update: &BookUpdate) -> StorybookResult<Book> {
        self.inner.replace_book(id, update).await
    }

    async fn update_book(&self, id: &str, patch: &BookPatch) -> StorybookResult<Book> {
        self.inner.update_book(id, patch).await
    }

    async fn delete_book(&self, id: &str) -> StorybookResult<()> {
        self.gate.notified().await;
        if self.fail_deletes {
            return Err(DatabaseError::new(DatabaseErrorKind::Connection(
                "database unavailable".to_string(),
            ))
            .into());
        }
        self.inner.delete_book(id).await
    }

    async fn delete_all_books(&self) -> StorybookResult<usize> {
        self.inner.delete_all_books().await
    }
}
