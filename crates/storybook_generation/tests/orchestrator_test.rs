// Pipeline tests with mock generators and the in-memory repository.

mod test_utils;

use std::sync::{Arc, Mutex};
use std::time::Duration;
use storybook_core::{DEFAULT_PAGE_COUNT, ListQuery, StoryRequest};
use storybook_database::InMemoryBookRepository;
use storybook_generation::{GenerationPhase, Orchestrator, RetryPolicy};
use storybook_interface::BookRepository;
use test_utils::{
    FailingRepository, ImageBehavior, MockImageGenerator, MockStoryGenerator, draft_with_pages,
};

fn quick_retry() -> RetryPolicy {
    RetryPolicy::builder()
        .max_retries(2usize)
        .delay(Duration::from_millis(1))
        .build()
        .unwrap()
}

fn request() -> StoryRequest {
    StoryRequest::new("a brave cat explores the moon")
        .with_main_character("Whiskers")
        .with_moral_value("courage")
}

#[tokio::test]
async fn full_book_is_illustrated_and_saved() -> anyhow::Result<()> {
    let repo = Arc::new(InMemoryBookRepository::new());
    let images = Arc::new(MockImageGenerator::new());
    let orchestrator = Orchestrator::new(
        Arc::new(MockStoryGenerator::new(draft_with_pages(DEFAULT_PAGE_COUNT as i32))),
        images.clone(),
        repo.clone(),
    )
    .with_retry(quick_retry());

    let report = orchestrator.generate(&request()).await?;
    let book = report.book();

    assert!(!report.is_partial());
    assert_eq!(book.pages.len(), 8);
    assert!(book.pages.iter().all(|p| p.is_complete()));
    assert_eq!(book.cover_image_url, book.pages[0].image_url);
    assert_eq!(book.theme, "a brave cat explores the moon");
    assert_eq!(book.moral_value, "courage");
    assert_eq!(images.total_attempts(), 8);

    let stored = repo.get_book(&book.id).await?;
    assert_eq!(stored.pages.len(), 8);
    assert_eq!(stored.title, "Budi and the Lost Kite");
    Ok(())
}

#[tokio::test]
async fn one_failed_illustration_leaves_the_rest() -> anyhow::Result<()> {
    let repo = Arc::new(InMemoryBookRepository::new());
    let images = Arc::new(MockImageGenerator::new().with("prompt 3", ImageBehavior::Upstream));
    let orchestrator = Orchestrator::new(
        Arc::new(MockStoryGenerator::new(draft_with_pages(8))),
        images.clone(),
        repo.clone(),
    )
    .with_retry(quick_retry());

    let report = orchestrator.generate(&request()).await?;

    assert!(report.is_partial());
    assert_eq!(report.failed_pages().len(), 1);
    assert_eq!(report.failed_pages()[0].page_number, 3);

    let page3 = report.book().page(3).unwrap();
    assert!(page3.image_url.is_none());
    assert_eq!(page3.content, "Page 3 text");
    assert_eq!(report.book().incomplete_pages(), vec![3]);

    // upstream errors are not retried
    assert_eq!(images.attempts("prompt 3"), 1);
    assert_eq!(repo.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn failed_first_page_leaves_no_cover() -> anyhow::Result<()> {
    let images = Arc::new(MockImageGenerator::new().with("prompt 1", ImageBehavior::Upstream));
    let orchestrator = Orchestrator::new(
        Arc::new(MockStoryGenerator::new(draft_with_pages(3))),
        images,
        Arc::new(InMemoryBookRepository::new()),
    )
    .with_retry(quick_retry());

    let report = orchestrator.generate(&request()).await?;
    assert!(report.book().cover_image_url.is_none());
    Ok(())
}

#[tokio::test]
async fn network_failures_are_retried() -> anyhow::Result<()> {
    let images = Arc::new(
        MockImageGenerator::new()
            .with("prompt 1", ImageBehavior::FlakyNetwork(2))
            .with("prompt 2", ImageBehavior::NetworkDown),
    );
    let orchestrator = Orchestrator::new(
        Arc::new(MockStoryGenerator::new(draft_with_pages(2))),
        images.clone(),
        Arc::new(InMemoryBookRepository::new()),
    )
    .with_retry(quick_retry());

    let report = orchestrator.generate(&request()).await?;

    assert_eq!(images.attempts("prompt 1"), 3);
    assert!(report.book().page(1).unwrap().is_complete());

    assert_eq!(images.attempts("prompt 2"), 3);
    assert_eq!(report.failed_pages().len(), 1);
    assert_eq!(report.failed_pages()[0].page_number, 2);
    Ok(())
}

#[tokio::test]
async fn drafting_failure_saves_nothing() {
    let repo = Arc::new(InMemoryBookRepository::new());
    let images = Arc::new(MockImageGenerator::new());
    let orchestrator = Orchestrator::new(
        Arc::new(MockStoryGenerator::failing()),
        images.clone(),
        repo.clone(),
    );

    assert!(orchestrator.generate(&request()).await.is_err());
    assert_eq!(images.total_attempts(), 0);
    assert!(repo.list_books(&ListQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn persistence_failure_is_reported() {
    let orchestrator = Orchestrator::new(
        Arc::new(MockStoryGenerator::new(draft_with_pages(2))),
        Arc::new(MockImageGenerator::new()),
        Arc::new(FailingRepository),
    );

    let err = orchestrator.generate(&request()).await.unwrap_err();
    assert!(err.message().contains("database unavailable"));
}

#[tokio::test]
async fn phases_are_observed_in_order() -> anyhow::Result<()> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let orchestrator = Orchestrator::new(
        Arc::new(MockStoryGenerator::new(draft_with_pages(1))),
        Arc::new(MockImageGenerator::new()),
        Arc::new(InMemoryBookRepository::new()),
    )
    .with_observer(Arc::new(move |phase: GenerationPhase| sink.lock().unwrap().push(phase)));

    orchestrator.generate(&request()).await?;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            GenerationPhase::Drafting,
            GenerationPhase::Illustrating,
            GenerationPhase::Assembling,
            GenerationPhase::Persisting,
            GenerationPhase::Done,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn regenerate_returns_image_reference() -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(
        Arc::new(MockStoryGenerator::failing()),
        Arc::new(MockImageGenerator::new()),
        Arc::new(InMemoryBookRepository::new()),
    );

    let reference = orchestrator.regenerate_page_image("a red kite").await?;
    assert_eq!(reference, "https://img.test/a-red-kite");
    Ok(())
}
