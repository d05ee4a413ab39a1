//! Core data types for the Storybook generation service.
//!
//! This crate provides the book model, the wizard request and story draft
//! shapes, image results, list queries and settings shared by every other crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod book;
mod image;
mod query;
mod settings;
mod story;
mod update;

pub use book::{Book, BookSummary, Page, new_book_id, validate_page_numbers};
pub use image::ImageResult;
pub use query::{ListQuery, SortKey, SortOrder};
pub use settings::{ImageEngine, Settings, SharedSettings, ValidationResult};
pub use story::{DEFAULT_PAGE_COUNT, PageDraft, StoryDraft, StoryRequest};
pub use update::{BookPatch, BookUpdate, PageUpdate};
