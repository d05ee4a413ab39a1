//! Wizard requests and drafted stories.

use crate::Page;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Pages requested from the text model.
pub const DEFAULT_PAGE_COUNT: usize = 8;

fn default_target_age() -> String {
    "3-5".to_string()
}

fn default_genre() -> String {
    "Adventure".to_string()
}

fn default_illustration_style() -> String {
    "Cartoon".to_string()
}

fn default_character_type() -> String {
    "Human".to_string()
}

fn default_language() -> String {
    "Indonesian".to_string()
}

/// Creation wizard form.
///
/// # Examples
///
/// ```
/// use storybook_core::StoryRequest;
///
/// let request: StoryRequest =
///     serde_json::from_str(r#"{"theme": "friendship", "mainCharacter": "Budi"}"#).unwrap();
/// assert_eq!(request.target_age, "3-5");
/// assert_eq!(request.language, "Indonesian");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRequest {
    /// What the story is about
    pub theme: String,
    /// Name or short description of the protagonist
    #[serde(default)]
    pub main_character: String,
    /// Target-age label
    #[serde(default = "default_target_age")]
    pub target_age: String,
    /// Moral the story should teach
    #[serde(default)]
    pub moral_value: String,
    /// Story genre
    #[serde(default = "default_genre")]
    pub genre: String,
    /// Illustration style passed to prompts
    #[serde(default = "default_illustration_style")]
    pub illustration_style: String,
    /// Kind of protagonist (human, animal, robot, ...)
    #[serde(default = "default_character_type")]
    pub character_type: String,
    /// Language of the story text
    #[serde(default = "default_language")]
    pub language: String,
}

impl StoryRequest {
    /// A request with wizard defaults for everything but the theme.
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            main_character: String::new(),
            target_age: default_target_age(),
            moral_value: String::new(),
            genre: default_genre(),
            illustration_style: default_illustration_style(),
            character_type: default_character_type(),
            language: default_language(),
        }
    }

    /// Sets the protagonist.
    pub fn with_main_character(mut self, main_character: impl Into<String>) -> Self {
        self.main_character = main_character.into();
        self
    }

    /// Sets the moral value.
    pub fn with_moral_value(mut self, moral_value: impl Into<String>) -> Self {
        self.moral_value = moral_value.into();
        self
    }

    /// Sets the target-age label.
    pub fn with_target_age(mut self, target_age: impl Into<String>) -> Self {
        self.target_age = target_age.into();
        self
    }

    /// Sets the story language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// One drafted page, before illustration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDraft {
    /// Position within the book
    pub page_number: i32,
    /// Story text
    pub content: String,
    /// Illustration prompt
    pub image_prompt: String,
}

impl From<PageDraft> for Page {
    fn from(draft: PageDraft) -> Self {
        Page::new(draft.page_number, draft.content, draft.image_prompt)
    }
}

/// Structured output of the text model: a title plus page drafts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDraft {
    /// Generated title
    pub title: String,
    /// Page drafts
    #[serde(default)]
    pub pages: Vec<PageDraft>,
}

impl StoryDraft {
    /// Checks that the draft can become a book.
    ///
    /// The title and page list must be non-empty and page numbers positive
    /// and unique. The page count itself is not enforced.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("story has no title".to_string());
        }
        if self.pages.is_empty() {
            return Err("story has no pages".to_string());
        }
        let mut seen = HashSet::with_capacity(self.pages.len());
        for page in &self.pages {
            if page.page_number <= 0 {
                return Err(format!("invalid page number {}", page.page_number));
            }
            if !seen.insert(page.page_number) {
                return Err(format!("duplicate page number {}", page.page_number));
            }
        }
        Ok(())
    }

    /// Orders drafts by page number.
    pub fn sort_pages(&mut self) {
        self.pages.sort_by_key(|p| p.page_number);
    }

    /// Converts drafts into image-less pages, in page order.
    pub fn into_pages(mut self) -> Vec<Page> {
        self.sort_pages();
        self.pages.into_iter().map(Page::from).collect()
    }
}
