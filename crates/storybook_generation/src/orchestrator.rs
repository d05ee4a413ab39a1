//! The generation pipeline: draft, illustrate, assemble, persist.

use crate::{GenerationPhase, GenerationReport, PageFailure, RetryPolicy};
use futures::future::join_all;
use std::sync::Arc;
use storybook_core::{Book, Page, StoryRequest, new_book_id};
use storybook_error::StorybookResult;
use storybook_interface::{BookRepository, ImageGenerator, StoryGenerator};
use tracing::{info, instrument, warn};

/// Callback invoked on every phase change.
pub type PhaseObserver = Arc<dyn Fn(GenerationPhase) + Send + Sync>;

/// Runs one book generation end to end.
///
/// A drafting failure aborts the run before anything is saved. Illustration
/// failures are isolated to their page and reported. Image requests are
/// retried according to the [`RetryPolicy`]; the pipeline as a whole is not.
#[derive(Clone)]
pub struct Orchestrator {
    stories: Arc<dyn StoryGenerator>,
    images: Arc<dyn ImageGenerator>,
    books: Arc<dyn BookRepository>,
    retry: RetryPolicy,
    observer: Option<PhaseObserver>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("image_engine", &self.images.engine())
            .field("retry", &self.retry)
            .finish()
    }
}

impl Orchestrator {
    /// Pipeline over the given generators and repository, with default retries.
    pub fn new(
        stories: Arc<dyn StoryGenerator>,
        images: Arc<dyn ImageGenerator>,
        books: Arc<dyn BookRepository>,
    ) -> Self {
        Self {
            stories,
            images,
            books,
            retry: RetryPolicy::default(),
            observer: None,
        }
    }

    /// Overrides the image retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Registers a phase observer.
    pub fn with_observer(mut self, observer: PhaseObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    fn enter(&self, phase: GenerationPhase) {
        info!(%phase, "Generation phase");
        if let Some(observer) = &self.observer {
            observer(phase);
        }
    }

    /// Generate, illustrate and save a book for `request`.
    ///
    /// # Errors
    ///
    /// Fails when drafting or saving fails. Illustration failures are not
    /// errors; see [`GenerationReport::failed_pages`].
    #[instrument(skip(self, request), fields(theme = %request.theme))]
    pub async fn generate(&self, request: &StoryRequest) -> StorybookResult<GenerationReport> {
        self.enter(GenerationPhase::Drafting);
        let draft = self.stories.generate_story(request).await?;
        let title = draft.title.clone();

        self.enter(GenerationPhase::Illustrating);
        let pages = draft.into_pages();
        let results = join_all(pages.iter().map(|page| self.illustrate(&page.image_prompt))).await;

        let mut failed_pages = Vec::new();
        let pages: Vec<Page> = pages
            .into_iter()
            .zip(results)
            .map(|(mut page, result)| {
                match result {
                    Ok(reference) => page.image_url = Some(reference),
                    Err(e) => {
                        warn!(page = page.page_number, error = %e.message(), "Illustration failed");
                        failed_pages.push(PageFailure {
                            page_number: page.page_number,
                            message: e.message(),
                        });
                    }
                }
                page
            })
            .collect();

        self.enter(GenerationPhase::Assembling);
        let book = Book {
            id: new_book_id(),
            title,
            theme: request.theme.clone(),
            target_age: request.target_age.clone(),
            moral_value: request.moral_value.clone(),
            cover_image_url: pages.first().and_then(|page| page.image_url.clone()),
            pages,
            created_at: None,
        };

        self.enter(GenerationPhase::Persisting);
        self.books.create_book(&book).await?;

        self.enter(GenerationPhase::Done);
        info!(
            book_id = %book.id,
            failed = failed_pages.len(),
            "Book generated"
        );
        Ok(GenerationReport::new(book, failed_pages))
    }

    /// Generate a single illustration for the page editor.
    ///
    /// Returns the image reference to store on the page.
    ///
    /// # Errors
    ///
    /// The image engine's error after retries.
    #[instrument(skip(self, prompt))]
    pub async fn regenerate_page_image(&self, prompt: &str) -> StorybookResult<String> {
        self.illustrate(prompt).await
    }

    async fn illustrate(&self, prompt: &str) -> StorybookResult<String> {
        let image = self.retry.run(|| self.images.generate(prompt)).await?;
        Ok(image.to_reference())
    }
}
