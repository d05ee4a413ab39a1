//! Error types for the Storybook service.
//!
//! This crate provides the foundation error types used throughout the Storybook workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use storybook_error::{StorybookResult, HttpError};
//!
//! fn fetch_data() -> StorybookResult<String> {
//!     Err(HttpError::unreachable("Connection refused"))?
//! }
//!
//! match fetch_data() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod generation;
mod http;
mod json;
mod provider;
mod server;
mod storage;
mod validation;

pub use config::{ConfigError, ConfigErrorKind};
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{StorybookError, StorybookErrorKind, StorybookResult};
pub use generation::{GenerationError, GenerationErrorKind};
pub use http::{HttpError, HttpErrorKind};
pub use json::{JsonError, JsonErrorKind};
pub use provider::{ProviderError, ProviderErrorKind, RetryableError};
pub use server::{ServerError, ServerErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use validation::ValidationError;
