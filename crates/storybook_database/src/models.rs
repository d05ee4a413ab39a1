//! Diesel row models for books, pages and the settings record.

use crate::schema::{app_settings, books, pages};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use storybook_core::{Book, BookPatch, BookSummary, ImageEngine, Page, SharedSettings};

/// Database row for the `books` table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookRow {
    pub id: String,
    pub title: String,
    pub theme: String,
    pub target_age: String,
    pub moral_value: String,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BookRow {
    /// Assemble a domain book from this row and its page rows.
    pub fn into_book(self, page_rows: Vec<PageRow>) -> Book {
        let mut pages: Vec<Page> = page_rows.into_iter().map(Page::from).collect();
        pages.sort_by_key(|p| p.page_number);
        Book {
            id: self.id,
            title: self.title,
            theme: self.theme,
            target_age: self.target_age,
            moral_value: self.moral_value,
            cover_image_url: self.cover_image_url,
            pages,
            created_at: Some(self.created_at),
        }
    }
}

impl From<BookRow> for BookSummary {
    fn from(row: BookRow) -> Self {
        BookSummary {
            id: row.id,
            title: row.title,
            theme: row.theme,
            target_age: row.target_age,
            moral_value: row.moral_value,
            cover_image_url: row.cover_image_url,
            created_at: Some(row.created_at),
        }
    }
}

/// Insertable book row. `created_at` is always assigned by the store.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = books)]
pub struct NewBookRow {
    pub id: String,
    pub title: String,
    pub theme: String,
    pub target_age: String,
    pub moral_value: String,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewBookRow {
    /// Row for `book`, stamped with `created_at`.
    pub fn from_book(book: &Book, created_at: DateTime<Utc>) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            theme: book.theme.clone(),
            target_age: book.target_age.clone(),
            moral_value: book.moral_value.clone(),
            cover_image_url: book.cover_image_url.clone(),
            created_at,
        }
    }
}

/// Partial book update. `None` fields are left out of the `SET` clause.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = books)]
pub struct BookChangeset {
    pub title: Option<String>,
    pub theme: Option<String>,
    pub target_age: Option<String>,
    pub moral_value: Option<String>,
    pub cover_image_url: Option<String>,
}

impl BookChangeset {
    /// Diesel rejects an update with nothing to set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.theme.is_none()
            && self.target_age.is_none()
            && self.moral_value.is_none()
            && self.cover_image_url.is_none()
    }
}

impl From<&BookPatch> for BookChangeset {
    fn from(patch: &BookPatch) -> Self {
        Self {
            title: patch.title.clone(),
            theme: patch.theme.clone(),
            target_age: patch.target_age.clone(),
            moral_value: patch.moral_value.clone(),
            cover_image_url: patch.cover_image_url.clone(),
        }
    }
}

/// Database row for the `pages` table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Associations)]
#[diesel(belongs_to(BookRow, foreign_key = book_id))]
#[diesel(table_name = pages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PageRow {
    pub id: String,
    pub book_id: String,
    pub page_number: i32,
    pub content: String,
    pub image_url: Option<String>,
    pub image_prompt: String,
}

impl From<PageRow> for Page {
    fn from(row: PageRow) -> Self {
        Page {
            page_number: row.page_number,
            content: row.content,
            image_prompt: row.image_prompt,
            image_url: row.image_url,
        }
    }
}

/// Insertable page row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pages)]
pub struct NewPageRow {
    pub id: String,
    pub book_id: String,
    pub page_number: i32,
    pub content: String,
    pub image_url: Option<String>,
    pub image_prompt: String,
}

impl NewPageRow {
    /// Row for `page` of book `book_id`; the id is `"{book_id}-{page_number}"`.
    pub fn from_page(book_id: &str, page: &Page) -> Self {
        Self {
            id: page_row_id(book_id, page.page_number),
            book_id: book_id.to_string(),
            page_number: page.page_number,
            content: page.content.clone(),
            image_url: page.image_url.clone(),
            image_prompt: page.image_prompt.clone(),
        }
    }
}

/// Page row identifier.
pub fn page_row_id(book_id: &str, page_number: i32) -> String {
    format!("{}-{}", book_id, page_number)
}

/// The single row of the `app_settings` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = app_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SettingsRow {
    pub id: String,
    pub brand_name: String,
    pub brand_logo: String,
    pub brand_logo_url: String,
    pub image_engine: String,
    pub updated_at: DateTime<Utc>,
}

impl SettingsRow {
    /// Row holding `settings` under `id`.
    pub fn from_shared(id: &str, settings: &SharedSettings, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            brand_name: settings.brand_name.clone(),
            brand_logo: settings.brand_logo.clone(),
            brand_logo_url: settings.brand_logo_url.clone(),
            image_engine: settings.image_engine.to_string(),
            updated_at,
        }
    }
}

impl From<SettingsRow> for SharedSettings {
    fn from(row: SettingsRow) -> Self {
        let image_engine = row.image_engine.parse::<ImageEngine>().unwrap_or_else(|_| {
            tracing::warn!(engine = %row.image_engine, "Unknown stored image engine, using default");
            ImageEngine::default()
        });
        SharedSettings {
            brand_name: row.brand_name,
            brand_logo: row.brand_logo,
            brand_logo_url: row.brand_logo_url,
            image_engine,
        }
    }
}
