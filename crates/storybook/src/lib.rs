//! Storybook: AI-generated, illustrated children's books.
//!
//! This crate is the client side of Storybook. It re-exports the building
//! blocks from the workspace crates and adds:
//!
//! - [`Store`]: application state as a reducer over [`Action`]s, with
//!   optimistic deletes and settings persistence
//! - [`HttpGateway`]: the server's books and settings API as repositories
//! - [`LocalSettingsStore`]: settings kept in a small quota-bounded key space
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use storybook::{
//!     HttpGateway, HttpTransport, ImageGeneratorChain, Orchestrator, ProxyClient,
//!     ProxyStoryGenerator, Store, StoryRequest,
//! };
//!
//! # async fn run() -> storybook::StorybookResult<()> {
//! let gateway = Arc::new(HttpGateway::new("http://localhost:3000"));
//! let client = ProxyClient::new(Arc::new(HttpTransport::new()), "http://localhost:3000");
//! let orchestrator = Orchestrator::new(
//!     Arc::new(ProxyStoryGenerator::new(client.clone())),
//!     Arc::new(ImageGeneratorChain::for_engines(&[Default::default()], client)),
//!     gateway.clone(),
//! );
//!
//! let mut store = Store::new(gateway);
//! let report = store
//!     .generate_book(&StoryRequest::new("a kite that wants to fly"), &orchestrator)
//!     .await?;
//! println!("{} pages, {} failed", report.book().pages.len(), report.failed_pages().len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod http_gateway;
mod local_settings;
mod store;

pub use http_gateway::{DEFAULT_SERVER_URL, HttpGateway};
pub use local_settings::{
    DEFAULT_QUOTA, FileKeyValueStore, LOGO_URL_DROP_THRESHOLD, LocalSettingsStore, SETTINGS_KEY,
    SaveOutcome,
};
pub use store::{Action, AppState, DeleteFailure, DeleteTicket, Store, wait_for_push};

// Re-export workspace crates
pub use storybook_core::*;
pub use storybook_error::*;
pub use storybook_generation::*;
pub use storybook_interface::*;
pub use storybook_models::{
    FreepikProxyRequest, GeminiProxyRequest, HttpTransport, IMAGEN_MODEL, ImagenProxyRequest,
    ProviderTransport,
};
