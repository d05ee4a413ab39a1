//! Upstream provider clients for Storybook.
//!
//! Clients for the Gemini REST API (text, image and Imagen `predict`) and
//! Freepik text-to-image. All network access goes through the
//! [`ProviderTransport`] seam, so tests substitute a scripted transport and
//! the proxy can relay raw upstream statuses and bodies.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use storybook_models::{GeminiClient, GenerateContentRequest, HttpTransport, GEMINI_TEXT_MODEL};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new(Arc::new(HttpTransport::new()));
//! let request = GenerateContentRequest::from_prompt("Hi", None);
//! let response = client.generate("my-key", GEMINI_TEXT_MODEL, &request).await?;
//! println!("{}", response.first_text()?);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod freepik;
mod gemini;
mod proxy_wire;
mod transport;

pub use freepik::{FREEPIK_API_BASE, FREEPIK_PROVIDER, FreepikClient, freepik_image, freepik_request_body};
pub use gemini::{
    Candidate, Content, GEMINI_API_BASE, GEMINI_IMAGE_MODEL, GEMINI_PROVIDER, GEMINI_TEXT_MODEL,
    GenerateContentRequest, GenerateContentRequestBuilder, GenerateContentResponse, IMAGEN_MODEL,
    GeminiClient, InlineData, Part, imagen_image, normalize_contents,
};
pub use proxy_wire::{
    FreepikProxyRequest, GeminiProxyRequest, ImagenProxyRequest, NETWORK_FAILURE_KIND,
};
pub use transport::{HttpTransport, ProviderTransport, UpstreamRequest, UpstreamResponse};
