//! HTTP API and provider proxy for Storybook.
//!
//! The server persists books and the global settings record, and proxies
//! text and image generation requests to Gemini, Imagen and Freepik so that
//! provider keys never leave the server unless the caller brings its own.
//!
//! # Example
//!
//! ```rust,no_run
//! use storybook_server::{ServerConfig, StorageBackend, build_state, init_logging, serve};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::load(None)?;
//! init_logging(config.logging())?;
//! let state = build_state(&config, StorageBackend::InMemory).await?;
//! serve(&config, state).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod logging;
mod proxy;
mod routes;
mod server;
mod state;

pub use config::{
    DEFAULT_BIND_ADDRESS, DEFAULT_BODY_LIMIT, ProxyKeys, ServerConfig, ServerConfigBuilder,
    UpstreamConfig,
};
pub use error::ApiError;
pub use logging::{LoggingConfig, init_logging};
pub use proxy::{ProviderProxy, ProxyReply};
pub use routes::build_router;
pub use server::{StorageBackend, build_state, serve};
pub use state::AppState;
