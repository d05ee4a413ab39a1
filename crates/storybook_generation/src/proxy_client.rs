//! Client side of the provider proxy.

use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use storybook_core::ValidationResult;
use storybook_error::{ProviderError, ProviderErrorKind, StorybookResult};
use storybook_models::{
    FREEPIK_PROVIDER, FreepikProxyRequest, GEMINI_PROVIDER, GEMINI_TEXT_MODEL, GeminiProxyRequest,
    ImagenProxyRequest, NETWORK_FAILURE_KIND, ProviderTransport, UpstreamRequest,
};
use tracing::{debug, instrument, warn};

/// Calls the proxy endpoints of a Storybook server.
///
/// Optional user keys are attached to every request and take precedence
/// over the server's own keys.
#[derive(Clone)]
pub struct ProxyClient {
    transport: Arc<dyn ProviderTransport>,
    base_url: String,
    gemini_api_key: Option<String>,
    freepik_api_key: Option<String>,
}

impl std::fmt::Debug for ProxyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyClient")
            .field("base_url", &self.base_url)
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<set>"))
            .field("freepik_api_key", &self.freepik_api_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

fn non_blank(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}

impl ProxyClient {
    /// Client for the server at `base_url` (e.g. `http://localhost:3000`).
    pub fn new(transport: Arc<dyn ProviderTransport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            gemini_api_key: None,
            freepik_api_key: None,
        }
    }

    /// Sets the user key overrides. Blank keys count as absent.
    pub fn with_keys(mut self, gemini: Option<String>, freepik: Option<String>) -> Self {
        self.gemini_api_key = non_blank(gemini);
        self.freepik_api_key = non_blank(freepik);
        self
    }

    /// Gemini key override, if any.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini_api_key.as_deref()
    }

    async fn post<B: Serialize>(
        &self,
        path: &str,
        provider: &str,
        body: &B,
    ) -> Result<Value, ProviderError> {
        let body = serde_json::to_value(body).map_err(|e| {
            ProviderError::new(ProviderErrorKind::InvalidResponse(format!(
                "Failed to encode proxy request: {}",
                e
            )))
        })?;
        let url = format!("{}{}", self.base_url, path);
        let response = self.transport.post_json(UpstreamRequest::new(url, body)).await?;

        if response.is_success() {
            debug!(status = response.status, "Proxy call succeeded");
            return Ok(response.body);
        }

        let status = response.status;
        let message = response.error_message();
        warn!(status, error = %message, "Proxy call failed");
        if response.body.get("kind").and_then(Value::as_str) == Some(NETWORK_FAILURE_KIND) {
            let detail = message.strip_prefix("Network error: ").unwrap_or(&message);
            return Err(ProviderError::new(ProviderErrorKind::Network(detail.to_string())));
        }
        let kind = if message.to_lowercase().contains("not configured") {
            ProviderErrorKind::MissingApiKey(provider.to_string())
        } else {
            ProviderErrorKind::from_upstream(provider, status, message)
        };
        Err(ProviderError::new(kind))
    }

    /// `POST /api/proxy/gemini`; the user key is attached unless one is set.
    ///
    /// # Errors
    ///
    /// Network failures, missing or revoked keys and upstream errors.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn gemini(&self, mut request: GeminiProxyRequest) -> Result<Value, ProviderError> {
        if request.api_key.is_none() {
            request.api_key = self.gemini_api_key.clone();
        }
        self.post("/api/proxy/gemini", GEMINI_PROVIDER, &request).await
    }

    /// `POST /api/proxy/freepik`.
    ///
    /// # Errors
    ///
    /// Network failures, missing or revoked keys and upstream errors.
    #[instrument(skip(self, prompt))]
    pub async fn freepik(&self, prompt: &str) -> Result<Value, ProviderError> {
        let request = FreepikProxyRequest {
            prompt: prompt.to_string(),
            api_key: self.freepik_api_key.clone(),
        };
        self.post("/api/proxy/freepik", FREEPIK_PROVIDER, &request).await
    }

    /// `POST /api/proxy/imagen`.
    ///
    /// # Errors
    ///
    /// Network failures, missing or revoked keys and upstream errors.
    #[instrument(skip(self, prompt))]
    pub async fn imagen(&self, prompt: &str) -> Result<Value, ProviderError> {
        let request = ImagenProxyRequest {
            prompt: prompt.to_string(),
            model: None,
            api_key: self.gemini_api_key.clone(),
        };
        self.post("/api/proxy/imagen", GEMINI_PROVIDER, &request).await
    }

    /// Check a Gemini key with a one-token request.
    ///
    /// Never fails: problems are reported in the result.
    #[instrument(skip(self, key))]
    pub async fn validate_gemini_key(&self, key: &str) -> ValidationResult {
        if key.trim().is_empty() {
            return ValidationResult::invalid("API key is empty");
        }
        let request = ping_request().with_api_key(Some(key.to_string()));
        match self.gemini(request).await {
            Ok(_) => ValidationResult::valid("API key is valid"),
            Err(e) => ValidationResult::invalid(e.kind.to_string()),
        }
    }

    /// Send a one-token request with the configured keys.
    ///
    /// # Errors
    ///
    /// Whatever the proxy call fails with.
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> StorybookResult<()> {
        self.gemini(ping_request()).await?;
        Ok(())
    }
}

fn ping_request() -> GeminiProxyRequest {
    GeminiProxyRequest::new(GEMINI_TEXT_MODEL, json!([{"parts": [{"text": "Hi"}]}]))
        .with_config(json!({"maxOutputTokens": 1}))
}
