//! Trait definitions for the Storybook service.
//!
//! The seams between the store, the orchestrator and their backends:
//! - [`BookRepository`] persists books and their pages
//! - [`SettingsRepository`] holds the shared settings record
//! - [`StoryGenerator`] drafts a story from a wizard request
//! - [`ImageGenerator`] illustrates one page prompt

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{BookRepository, ImageGenerator, SettingsRepository, StoryGenerator};
