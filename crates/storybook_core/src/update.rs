//! Full and partial update payloads.

use crate::{Book, Page};
use serde::{Deserialize, Serialize};

/// Full replacement of a book's descriptive fields (`PUT`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookUpdate {
    /// New title
    pub title: String,
    /// New theme
    pub theme: String,
    /// New target-age label
    pub target_age: String,
    /// New moral-value label
    pub moral_value: String,
}

/// Partial update with coalesce-on-null semantics (`PATCH`).
///
/// Absent and `null` fields both keep their stored value.
///
/// # Examples
///
/// ```
/// use storybook_core::BookPatch;
///
/// let patch: BookPatch = serde_json::from_str(r#"{"theme": null}"#).unwrap();
/// assert!(patch.is_empty());
///
/// let patch: BookPatch = serde_json::from_str(r#"{"title": "X"}"#).unwrap();
/// assert_eq!(patch.title.as_deref(), Some("X"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    /// Replacement title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Replacement theme
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Replacement target-age label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_age: Option<String>,
    /// Replacement moral-value label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moral_value: Option<String>,
    /// Replacement cover illustration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    /// Replacement page set (edited pages are saved as a whole)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<Page>>,
}

impl BookPatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.theme.is_none()
            && self.target_age.is_none()
            && self.moral_value.is_none()
            && self.cover_image_url.is_none()
            && self.pages.is_none()
    }

    /// Applies the patch to an in-memory book.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(theme) = &self.theme {
            book.theme = theme.clone();
        }
        if let Some(target_age) = &self.target_age {
            book.target_age = target_age.clone();
        }
        if let Some(moral_value) = &self.moral_value {
            book.moral_value = moral_value.clone();
        }
        if let Some(cover) = &self.cover_image_url {
            book.cover_image_url = Some(cover.clone());
        }
        if let Some(pages) = &self.pages {
            book.pages = pages.clone();
            book.sort_pages();
        }
    }
}

impl From<BookUpdate> for BookPatch {
    fn from(update: BookUpdate) -> Self {
        Self {
            title: Some(update.title),
            theme: Some(update.theme),
            target_age: Some(update.target_age),
            moral_value: Some(update.moral_value),
            cover_image_url: None,
            pages: None,
        }
    }
}

/// In-editor changes to a single page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUpdate {
    /// Replacement story text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Replacement illustration prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    /// Replacement illustration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl PageUpdate {
    /// Applies the update to a page, keeping unspecified fields.
    pub fn apply_to(&self, page: &mut Page) {
        if let Some(content) = &self.content {
            page.content = content.clone();
        }
        if let Some(prompt) = &self.image_prompt {
            page.image_prompt = prompt.clone();
        }
        if let Some(url) = &self.image_url {
            page.image_url = Some(url.clone());
        }
    }
}
