//! Book generation for Storybook.
//!
//! The [`Orchestrator`] turns a wizard request into a saved book:
//!
//! 1. **Drafting**: a [`StoryGenerator`](storybook_interface::StoryGenerator)
//!    produces a title and page drafts
//! 2. **Illustrating**: every page prompt goes to an
//!    [`ImageGenerator`](storybook_interface::ImageGenerator) concurrently;
//!    failures stay with their page
//! 3. **Assembling**: pages, images and form fields become a [`Book`](storybook_core::Book)
//! 4. **Persisting**: the book is saved through a
//!    [`BookRepository`](storybook_interface::BookRepository)
//!
//! The proxy-backed generators in this crate talk to a Storybook server's
//! `/api/proxy/*` endpoints through [`ProxyClient`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod images;
mod orchestrator;
mod proxy_client;
mod report;
mod retry;
mod story;

pub use images::{
    FreepikImageGenerator, GeminiImageGenerator, ImageGeneratorChain, ImagenImageGenerator,
    image_generator_for,
};
pub use orchestrator::{Orchestrator, PhaseObserver};
pub use proxy_client::ProxyClient;
pub use report::{GenerationPhase, GenerationReport, PageFailure};
pub use retry::{RetryPolicy, RetryPolicyBuilder};
pub use story::{ProxyStoryGenerator, parse_story_draft, story_prompt, story_response_schema};
