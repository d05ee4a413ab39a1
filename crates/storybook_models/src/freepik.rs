//! Freepik text-to-image client.

use crate::{ProviderTransport, UpstreamRequest, UpstreamResponse};
use serde_json::{Value, json};
use std::sync::Arc;
use storybook_core::ImageResult;
use storybook_error::{ProviderError, ProviderErrorKind};
use tracing::{debug, instrument};

/// Public Freepik endpoint.
pub const FREEPIK_API_BASE: &str = "https://api.freepik.com";

/// Provider label used in error messages.
pub const FREEPIK_PROVIDER: &str = "Freepik";

/// Request body for one square cartoon image.
pub fn freepik_request_body(prompt: &str) -> Value {
    json!({
        "prompt": prompt,
        "num_images": 1,
        "image": {"size": "square_1_1"},
        "styling": {"style": "cartoon"},
    })
}

/// First image of a Freepik response.
///
/// Inline base64 wins over a hosted URL.
///
/// # Errors
///
/// [`ProviderErrorKind::NoImage`] when `data[0]` has neither.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use storybook_models::freepik_image;
///
/// let body = json!({"data": [{"url": "https://cdn/1.png"}]});
/// assert_eq!(freepik_image(&body).unwrap().to_reference(), "https://cdn/1.png");
/// ```
pub fn freepik_image(body: &Value) -> Result<ImageResult, ProviderError> {
    let first = body.pointer("/data/0");
    if let Some(data) = first.and_then(|d| d.get("base64")).and_then(Value::as_str) {
        return Ok(ImageResult::inline("image/png", data));
    }
    if let Some(url) = first.and_then(|d| d.get("url")).and_then(Value::as_str) {
        return Ok(ImageResult::hosted(url));
    }
    Err(ProviderError::new(ProviderErrorKind::NoImage(
        "Freepik returned no image".to_string(),
    )))
}

/// Freepik client over a [`ProviderTransport`].
#[derive(Clone)]
pub struct FreepikClient {
    transport: Arc<dyn ProviderTransport>,
    base_url: String,
}

impl std::fmt::Debug for FreepikClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreepikClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl FreepikClient {
    /// Client for the public endpoint.
    pub fn new(transport: Arc<dyn ProviderTransport>) -> Self {
        Self::with_base_url(transport, FREEPIK_API_BASE)
    }

    /// Client for a custom endpoint.
    pub fn with_base_url(transport: Arc<dyn ProviderTransport>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
        }
    }

    /// Call the text-to-image endpoint.
    ///
    /// # Errors
    ///
    /// Only transport failures are errors; upstream statuses are returned.
    #[instrument(skip(self, api_key, prompt))]
    pub async fn text_to_image(
        &self,
        api_key: &str,
        prompt: &str,
    ) -> Result<UpstreamResponse, ProviderError> {
        debug!("Sending Freepik text-to-image request");
        let upstream = UpstreamRequest::new(
            format!("{}/v1/ai/text-to-image", self.base_url),
            freepik_request_body(prompt),
        )
        .header("x-freepik-api-key", api_key);
        self.transport.post_json(upstream).await
    }
}
