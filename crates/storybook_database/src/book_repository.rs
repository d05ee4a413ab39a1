//! PostgreSQL implementation of [`BookRepository`].

use crate::connection::{PgPool, run_blocking};
use crate::models::{BookChangeset, BookRow, NewBookRow, NewPageRow, PageRow};
use crate::schema::{books, pages};
use crate::DatabaseResult;
use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use storybook_core::{
    Book, BookPatch, BookSummary, BookUpdate, ListQuery, Page, SortKey, SortOrder,
    validate_page_numbers,
};
use storybook_error::{DatabaseError, StorybookResult, ValidationError};
use storybook_interface::BookRepository;
use tracing::{debug, info, instrument};

/// Books and pages stored in PostgreSQL through an r2d2 pool.
///
/// Every call checks out a pooled connection on the blocking thread pool.
/// Writes that touch both tables run in one transaction.
///
/// # Example
///
/// ```no_run
/// use storybook_database::{PostgresBookRepository, establish_pool, DEFAULT_POOL_SIZE};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = establish_pool("postgres://localhost/storybook", DEFAULT_POOL_SIZE)?;
/// let repo = PostgresBookRepository::new(pool);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PostgresBookRepository {
    pool: PgPool,
}

impl PostgresBookRepository {
    /// Create a repository over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run<T, F>(&self, op: F) -> StorybookResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> DatabaseResult<T> + Send + 'static,
    {
        run_blocking(&self.pool, op).await
    }
}

fn load_book(conn: &mut PgConnection, id: &str) -> DatabaseResult<Book> {
    let row: BookRow = books::table
        .find(id)
        .select(BookRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(DatabaseError::not_found)?;

    let page_rows: Vec<PageRow> = PageRow::belonging_to(&row)
        .select(PageRow::as_select())
        .order(pages::page_number.asc())
        .load(conn)?;

    Ok(row.into_book(page_rows))
}

fn insert_pages(conn: &mut PgConnection, book_id: &str, book_pages: &[Page]) -> DatabaseResult<()> {
    if book_pages.is_empty() {
        return Ok(());
    }
    let rows: Vec<NewPageRow> = book_pages
        .iter()
        .map(|page| NewPageRow::from_page(book_id, page))
        .collect();
    diesel::insert_into(pages::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

fn book_exists(conn: &mut PgConnection, id: &str) -> DatabaseResult<bool> {
    let found: Option<String> = books::table
        .find(id)
        .select(books::id)
        .first(conn)
        .optional()?;
    Ok(found.is_some())
}

#[async_trait]
impl BookRepository for PostgresBookRepository {
    #[instrument(skip(self, book), fields(book_id = %book.id, pages = book.pages.len()))]
    async fn create_book(&self, book: &Book) -> StorybookResult<String> {
        book.validate_pages().map_err(ValidationError::new)?;

        let book = book.clone();
        let id = self
            .run(move |conn| {
                conn.transaction::<_, DatabaseError, _>(|conn| {
                    let row = NewBookRow::from_book(&book, Utc::now());
                    diesel::insert_into(books::table)
                        .values(&row)
                        .execute(conn)?;
                    insert_pages(conn, &book.id, &book.pages)?;
                    Ok(book.id.clone())
                })
            })
            .await?;

        info!("Book saved");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn list_books(&self, query: &ListQuery) -> StorybookResult<Vec<BookSummary>> {
        let (key, order) = query.resolve();
        debug!(%key, %order, "Listing books");

        let rows = self
            .run(move |conn| {
                let listing = books::table.select(BookRow::as_select()).into_boxed();
                let listing = match (key, order) {
                    (SortKey::CreatedAt, SortOrder::Asc) => listing.order(books::created_at.asc()),
                    (SortKey::CreatedAt, SortOrder::Desc) => {
                        listing.order(books::created_at.desc())
                    }
                    (SortKey::Title, SortOrder::Asc) => listing.order(books::title.asc()),
                    (SortKey::Title, SortOrder::Desc) => listing.order(books::title.desc()),
                    (SortKey::Theme, SortOrder::Asc) => listing.order(books::theme.asc()),
                    (SortKey::Theme, SortOrder::Desc) => listing.order(books::theme.desc()),
                };
                Ok(listing.load::<BookRow>(conn)?)
            })
            .await?;

        Ok(rows.into_iter().map(BookSummary::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_book(&self, id: &str) -> StorybookResult<Book> {
        let id = id.to_string();
        self.run(move |conn| load_book(conn, &id)).await
    }

    #[instrument(skip(self, update))]
    async fn replace_book(&self, id: &str, update: &BookUpdate) -> StorybookResult<Book> {
        let id = id.to_string();
        let update = update.clone();
        self.run(move |conn| {
            conn.transaction::<_, DatabaseError, _>(|conn| {
                let changed = diesel::update(books::table.find(&id))
                    .set((
                        books::title.eq(&update.title),
                        books::theme.eq(&update.theme),
                        books::target_age.eq(&update.target_age),
                        books::moral_value.eq(&update.moral_value),
                    ))
                    .execute(conn)?;
                if changed == 0 {
                    return Err(DatabaseError::not_found());
                }
                load_book(conn, &id)
            })
        })
        .await
    }

    #[instrument(skip(self, patch), fields(replaces_pages = patch.pages.is_some()))]
    async fn update_book(&self, id: &str, patch: &BookPatch) -> StorybookResult<Book> {
        if let Some(new_pages) = &patch.pages {
            validate_page_numbers(new_pages).map_err(ValidationError::new)?;
        }

        let id = id.to_string();
        let changeset = BookChangeset::from(patch);
        let new_pages = patch.pages.clone();
        self.run(move |conn| {
            conn.transaction::<_, DatabaseError, _>(|conn| {
                if !book_exists(conn, &id)? {
                    return Err(DatabaseError::not_found());
                }
                if !changeset.is_empty() {
                    diesel::update(books::table.find(&id))
                        .set(&changeset)
                        .execute(conn)?;
                }
                if let Some(new_pages) = &new_pages {
                    diesel::delete(pages::table.filter(pages::book_id.eq(&id))).execute(conn)?;
                    insert_pages(conn, &id, new_pages)?;
                }
                load_book(conn, &id)
            })
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_book(&self, id: &str) -> StorybookResult<()> {
        let id = id.to_string();
        let removed = self
            .run(move |conn| {
                conn.transaction::<_, DatabaseError, _>(|conn| {
                    diesel::delete(pages::table.filter(pages::book_id.eq(&id))).execute(conn)?;
                    Ok(diesel::delete(books::table.find(&id)).execute(conn)?)
                })
            })
            .await?;
        debug!(removed, "Book deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all_books(&self) -> StorybookResult<usize> {
        let removed = self
            .run(|conn| {
                conn.transaction::<_, DatabaseError, _>(|conn| {
                    diesel::delete(pages::table).execute(conn)?;
                    Ok(diesel::delete(books::table).execute(conn)?)
                })
            })
            .await?;
        info!(removed, "All books deleted");
        Ok(removed)
    }
}
