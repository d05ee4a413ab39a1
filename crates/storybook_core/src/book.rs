//! Book and page records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One unit of story text plus its illustration prompt and optional image.
///
/// A page without an image reference is valid (rendered as a placeholder)
/// but counts as incomplete.
///
/// # Examples
///
/// ```
/// use storybook_core::Page;
///
/// let page = Page::new(1, "Whiskers looked up at the moon.", "A grey cat gazing at a full moon");
/// assert!(!page.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Position within the book, starting at 1
    pub page_number: i32,
    /// Story text shown on the page
    pub content: String,
    /// Text fed to the image generator
    pub image_prompt: String,
    /// Hosted URL or `data:` URL of the illustration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Page {
    /// Create a page without an illustration.
    pub fn new(page_number: i32, content: impl Into<String>, image_prompt: impl Into<String>) -> Self {
        Self {
            page_number,
            content: content.into(),
            image_prompt: image_prompt.into(),
            image_url: None,
        }
    }

    /// True once the page has an illustration.
    pub fn is_complete(&self) -> bool {
        self.image_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// A generated storybook: metadata plus ordered pages.
///
/// # Examples
///
/// ```
/// use storybook_core::{Book, Page};
///
/// let book = Book {
///     id: "abc".to_string(),
///     title: "Whiskers on the Moon".to_string(),
///     theme: "a brave cat explores the moon".to_string(),
///     target_age: "3-5".to_string(),
///     moral_value: "courage".to_string(),
///     cover_image_url: None,
///     pages: vec![Page::new(2, "b", "b"), Page::new(1, "a", "a")],
///     created_at: None,
/// };
///
/// assert!(book.validate_pages().is_ok());
/// assert!(book.has_contiguous_pages());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Opaque, client-generated identifier
    pub id: String,
    /// Generated title
    pub title: String,
    /// Theme entered in the wizard
    pub theme: String,
    /// Target-age label (e.g. "3-5")
    pub target_age: String,
    /// Moral-value label (e.g. "courage")
    pub moral_value: String,
    /// Cover illustration (hosted URL or `data:` URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    /// Pages, unique by page number
    #[serde(default)]
    pub pages: Vec<Page>,
    /// Assigned by the store on creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Book {
    /// Checks the structural page invariants: positive and unique page numbers.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violation found.
    pub fn validate_pages(&self) -> Result<(), String> {
        validate_page_numbers(&self.pages)
    }

    /// True when the pages form the sequence `1..=N`.
    pub fn has_contiguous_pages(&self) -> bool {
        let mut numbers: Vec<i32> = self.pages.iter().map(|p| p.page_number).collect();
        numbers.sort_unstable();
        numbers
            .iter()
            .enumerate()
            .all(|(index, number)| *number == index as i32 + 1)
    }

    /// Orders pages by page number, ascending.
    pub fn sort_pages(&mut self) {
        self.pages.sort_by_key(|p| p.page_number);
    }

    /// Page numbers that still lack an illustration.
    pub fn incomplete_pages(&self) -> Vec<i32> {
        self.pages
            .iter()
            .filter(|p| !p.is_complete())
            .map(|p| p.page_number)
            .collect()
    }

    /// Looks up a page by number.
    pub fn page(&self, page_number: i32) -> Option<&Page> {
        self.pages.iter().find(|p| p.page_number == page_number)
    }

    /// Mutable lookup of a page by number.
    pub fn page_mut(&mut self, page_number: i32) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.page_number == page_number)
    }

    /// Listing shape of this book.
    pub fn summary(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            theme: self.theme.clone(),
            target_age: self.target_age.clone(),
            moral_value: self.moral_value.clone(),
            cover_image_url: self.cover_image_url.clone(),
            created_at: self.created_at,
        }
    }
}

/// A book without its pages, as returned by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    /// Book identifier
    pub id: String,
    /// Title
    pub title: String,
    /// Theme
    pub theme: String,
    /// Target-age label
    pub target_age: String,
    /// Moral-value label
    pub moral_value: String,
    /// Cover illustration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Checks that page numbers are positive and unique.
///
/// # Errors
///
/// Returns a description of the first violation found.
pub fn validate_page_numbers(pages: &[Page]) -> Result<(), String> {
    let mut seen = HashSet::with_capacity(pages.len());
    for page in pages {
        if page.page_number <= 0 {
            return Err(format!(
                "page numbers must be positive, got {}",
                page.page_number
            ));
        }
        if !seen.insert(page.page_number) {
            return Err(format!("duplicate page number {}", page.page_number));
        }
    }
    Ok(())
}

/// Generate a fresh opaque book identifier.
///
/// Identifiers are short (12 hex characters) and drawn from a random UUID.
pub fn new_book_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}
