//! Deterministic story and image generators.

use async_trait::async_trait;
use storybook::{
    Book, ImageEngine, ImageGenerator, ImageResult, Page, PageDraft, ProviderError,
    ProviderErrorKind, StoryDraft, StoryGenerator, StoryRequest, StorybookResult, new_book_id,
};

/// Returns a draft with `pages` pages, prompts `"prompt {n}"`.
pub struct FixedStoryGenerator {
    pages: i32,
}

impl FixedStoryGenerator {
    /// Generator drafting `pages` pages.
    pub fn new(pages: i32) -> Self {
        Self { pages }
    }
}

#[async_trait]
impl StoryGenerator for FixedStoryGenerator {
    async fn generate_story(&self, request: &StoryRequest) -> StorybookResult<StoryDraft> {
        if self.pages == 0 {
            return Err(ProviderError::new(ProviderErrorKind::MissingApiKey(
                "Gemini".to_string(),
            ))
            .into());
        }
        Ok(StoryDraft {
            title: format!("A Story About {}", request.theme),
            pages: (1..=self.pages)
                .map(|n| PageDraft {
                    page_number: n,
                    content: format!("Page {n} text"),
                    image_prompt: format!("prompt {n}"),
                })
                .collect(),
        })
    }
}

/// Answers `https://img.test/{prompt}` with spaces as dashes.
pub struct EchoImageGenerator;

#[async_trait]
impl ImageGenerator for EchoImageGenerator {
    async fn generate(&self, prompt: &str) -> StorybookResult<ImageResult> {
        Ok(ImageResult::hosted(format!(
            "https://img.test/{}",
            prompt.replace(' ', "-")
        )))
    }

    fn engine(&self) -> ImageEngine {
        ImageEngine::Gemini
    }
}

/// A two-page book titled `title`.
pub fn sample_book(title: &str) -> Book {
    Book {
        id: new_book_id(),
        title: title.to_string(),
        theme: "friendship".to_string(),
        target_age: "3-5".to_string(),
        moral_value: "kindness".to_string(),
        cover_image_url: None,
        pages: vec![Page::new(1, "one", "p1"), Page::new(2, "two", "p2")],
        created_at: None,
    }
}
