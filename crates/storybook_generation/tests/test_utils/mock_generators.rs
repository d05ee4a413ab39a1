//! Mock story and image generators.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use storybook_core::{
    Book, BookPatch, BookSummary, BookUpdate, ImageEngine, ImageResult, ListQuery, PageDraft,
    StoryDraft, StoryRequest,
};
use storybook_error::{
    DatabaseError, DatabaseErrorKind, GenerationError, GenerationErrorKind, ProviderError,
    ProviderErrorKind, StorybookResult,
};
use storybook_interface::{BookRepository, ImageGenerator, StoryGenerator};

/// Draft with pages `1..=count`, prompts `"prompt {n}"`.
pub fn draft_with_pages(count: i32) -> StoryDraft {
    StoryDraft {
        title: "Budi and the Lost Kite".to_string(),
        pages: (1..=count)
            .map(|n| PageDraft {
                page_number: n,
                content: format!("Page {n} text"),
                image_prompt: format!("prompt {n}"),
            })
            .collect(),
    }
}

/// Story generator returning a fixed draft or a fixed error.
pub struct MockStoryGenerator {
    draft: Option<StoryDraft>,
    calls: AtomicUsize,
}

impl MockStoryGenerator {
    /// Always returns `draft`.
    pub fn new(draft: StoryDraft) -> Self {
        Self {
            draft: Some(draft),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails as if the model returned malformed JSON.
    pub fn failing() -> Self {
        Self {
            draft: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of calls.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoryGenerator for MockStoryGenerator {
    async fn generate_story(&self, _request: &StoryRequest) -> StorybookResult<StoryDraft> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.draft {
            Some(draft) => Ok(draft.clone()),
            None => Err(GenerationError::new(GenerationErrorKind::MalformedStory(
                "expected value at line 1 column 1".to_string(),
            ))
            .into()),
        }
    }
}

/// Per-prompt behavior of the mock image generator.
#[derive(Debug, Clone)]
pub enum ImageBehavior {
    /// Upstream error, never retried
    Upstream,
    /// Network error for the first `n` attempts, then success
    FlakyNetwork(usize),
    /// Network error on every attempt
    NetworkDown,
}

/// Image generator answering `https://img.test/{prompt}` unless told otherwise.
pub struct MockImageGenerator {
    behaviors: HashMap<String, ImageBehavior>,
    attempts: Mutex<HashMap<String, usize>>,
}

impl MockImageGenerator {
    /// Succeeds for every prompt.
    pub fn new() -> Self {
        Self {
            behaviors: HashMap::new(),
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Configure `prompt` to behave as `behavior`.
    pub fn with(mut self, prompt: &str, behavior: ImageBehavior) -> Self {
        self.behaviors.insert(prompt.to_string(), behavior);
        self
    }

    /// Attempts made for `prompt`.
    pub fn attempts(&self, prompt: &str) -> usize {
        self.attempts.lock().unwrap().get(prompt).copied().unwrap_or(0)
    }

    /// Attempts made across all prompts.
    pub fn total_attempts(&self) -> usize {
        self.attempts.lock().unwrap().values().sum()
    }
}

fn network_error() -> ProviderError {
    ProviderError::new(ProviderErrorKind::Network("connection reset".to_string()))
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(&self, prompt: &str) -> StorybookResult<ImageResult> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let count = attempts.entry(prompt.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        match self.behaviors.get(prompt) {
            None => Ok(ImageResult::hosted(format!("https://img.test/{}", prompt.replace(' ', "-")))),
            Some(ImageBehavior::Upstream) => Err(ProviderError::new(ProviderErrorKind::Upstream {
                status_code: 400,
                message: "prompt rejected".to_string(),
            })
            .into()),
            Some(ImageBehavior::FlakyNetwork(failures)) if attempt <= *failures => {
                Err(network_error().into())
            }
            Some(ImageBehavior::FlakyNetwork(_)) => Ok(ImageResult::inline("image/png", "AAAA")),
            Some(ImageBehavior::NetworkDown) => Err(network_error().into()),
        }
    }

    fn engine(&self) -> ImageEngine {
        ImageEngine::Gemini
    }
}

/// Repository whose writes always fail.
pub struct FailingRepository;

fn unavailable() -> DatabaseError {
    DatabaseError::new(DatabaseErrorKind::Connection("database unavailable".to_string()))
}

#[async_trait]
impl BookRepository for FailingRepository {
    async fn create_book(&self, _book: &Book) -> StorybookResult<String> {
        Err(unavailable().into())
    }

    async fn list_books(&self, _query: &ListQuery) -> StorybookResult<Vec<BookSummary>> {
        Err(unavailable().into())
    }

    async fn get_book(&self, _id: &str) -> StorybookResult<Book> {
        Err(unavailable().into())
    }

    async fn replace_book(&self, _id: &str, _update: &BookUpdate) -> StorybookResult<Book> {
        Err(unavailable().into())
    }

    async fn update_book(&self, _id: &str, _patch: &BookPatch) -> StorybookResult<Book> {
        Err(unavailable().into())
    }

    async fn delete_book(&self, _id: &str) -> StorybookResult<()> {
        Err(unavailable().into())
    }

    async fn delete_all_books(&self) -> StorybookResult<usize> {
        Err(unavailable().into())
    }
}
