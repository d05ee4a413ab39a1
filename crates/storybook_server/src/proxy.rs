//! Provider proxy: forwards generation requests so provider keys stay on the server.
//!
//! Every outcome is a [`ProxyReply`] (status plus JSON body) ready to send
//! back to the caller. Upstream error statuses are relayed unchanged.

use crate::{ProxyKeys, ServerConfig};
use serde_json::{Value, json};
use std::sync::Arc;
use storybook_error::{ProviderError, ProviderErrorKind};
use storybook_models::{
    FREEPIK_PROVIDER, FreepikClient, FreepikProxyRequest, GEMINI_PROVIDER, GeminiClient,
    GeminiProxyRequest, GenerateContentRequest, IMAGEN_MODEL, ImagenProxyRequest,
    NETWORK_FAILURE_KIND, ProviderTransport, UpstreamResponse, normalize_contents,
};
use tracing::{debug, instrument, warn};

/// Status and body returned to the proxy caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyReply {
    /// HTTP status
    pub status: u16,
    /// JSON body
    pub body: Value,
}

impl ProxyReply {
    /// 200 with `body`.
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    /// `{ "error": message }` with `status`.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({"error": message.into()}),
        }
    }

    fn missing_key(provider: &str) -> Self {
        let kind = ProviderErrorKind::MissingApiKey(provider.to_string());
        warn!(provider, "Proxy request rejected: no API key");
        Self::error(kind.status_code(), kind.to_string())
    }

    /// `{ error, kind: "network" }` so callers can tell it from an upstream 502.
    fn transport_failure(provider: &str, error: ProviderError) -> Self {
        warn!(provider, error = %error.kind, "Upstream unreachable");
        Self {
            status: error.kind.status_code(),
            body: json!({"error": error.kind.to_string(), "kind": NETWORK_FAILURE_KIND}),
        }
    }

    /// Relay an upstream non-2xx response: same status, `{ error, details }`.
    fn upstream_failure(provider: &str, response: UpstreamResponse) -> Self {
        let message = response.error_message();
        warn!(provider, status = response.status, error = %message, "Upstream error relayed");
        Self {
            status: response.status,
            body: json!({"error": message, "details": response.body}),
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Server side of the provider proxy.
#[derive(Debug, Clone)]
pub struct ProviderProxy {
    gemini: GeminiClient,
    freepik: FreepikClient,
    keys: ProxyKeys,
}

impl ProviderProxy {
    /// Proxy against the public provider endpoints.
    pub fn new(transport: Arc<dyn ProviderTransport>, keys: ProxyKeys) -> Self {
        Self {
            gemini: GeminiClient::new(transport.clone()),
            freepik: FreepikClient::new(transport),
            keys,
        }
    }

    /// Proxy configured from `config` (keys and upstream base URLs).
    pub fn from_config(transport: Arc<dyn ProviderTransport>, config: &ServerConfig) -> Self {
        let upstream = config.upstream();
        Self {
            gemini: GeminiClient::with_base_url(transport.clone(), &upstream.gemini_base_url),
            freepik: FreepikClient::with_base_url(transport, &upstream.freepik_base_url),
            keys: config.keys().clone(),
        }
    }

    /// Handle `POST /api/proxy/gemini`.
    ///
    /// `contents` is normalized to an array and `config` becomes
    /// `generationConfig`. Image requests get back `{ candidates }` only.
    #[instrument(skip(self, request), fields(model = %request.model, image = request.is_image()))]
    pub async fn gemini(&self, request: GeminiProxyRequest) -> ProxyReply {
        let Some(key) = ProxyKeys::resolve(request.api_key.as_deref(), self.keys.gemini.as_deref())
        else {
            return ProxyReply::missing_key(GEMINI_PROVIDER);
        };
        if request.model.trim().is_empty() {
            return ProxyReply::error(400, "model is required");
        }

        let is_image = request.is_image();
        let body = match GenerateContentRequest::builder()
            .contents(normalize_contents(request.contents))
            .generation_config(request.config)
            .build()
        {
            Ok(body) => body,
            Err(e) => return ProxyReply::error(400, format!("Invalid request: {}", e)),
        };

        match self.gemini.generate_content(key, &request.model, &body).await {
            Ok(response) if response.is_success() => {
                debug!("Gemini call succeeded");
                if is_image {
                    let candidates = response
                        .body
                        .get("candidates")
                        .cloned()
                        .unwrap_or_else(|| json!([]));
                    ProxyReply::ok(json!({"candidates": candidates}))
                } else {
                    ProxyReply::ok(response.body)
                }
            }
            Ok(response) => ProxyReply::upstream_failure(GEMINI_PROVIDER, response),
            Err(e) => ProxyReply::transport_failure(GEMINI_PROVIDER, e),
        }
    }

    /// Handle `POST /api/proxy/freepik`.
    #[instrument(skip(self, request))]
    pub async fn freepik(&self, request: FreepikProxyRequest) -> ProxyReply {
        let Some(key) =
            ProxyKeys::resolve(request.api_key.as_deref(), self.keys.freepik.as_deref())
        else {
            return ProxyReply::missing_key(FREEPIK_PROVIDER);
        };

        match self.freepik.text_to_image(key, &request.prompt).await {
            Ok(response) if response.is_success() => ProxyReply::ok(response.body),
            Ok(response) => ProxyReply::upstream_failure(FREEPIK_PROVIDER, response),
            Err(e) => ProxyReply::transport_failure(FREEPIK_PROVIDER, e),
        }
    }

    /// Handle `POST /api/proxy/imagen`.
    #[instrument(skip(self, request))]
    pub async fn imagen(&self, request: ImagenProxyRequest) -> ProxyReply {
        let Some(key) = ProxyKeys::resolve(request.api_key.as_deref(), self.keys.gemini.as_deref())
        else {
            return ProxyReply::missing_key(GEMINI_PROVIDER);
        };
        let model = request.model.as_deref().unwrap_or(IMAGEN_MODEL);

        match self.gemini.predict_image(key, model, &request.prompt).await {
            Ok(response) if response.is_success() => ProxyReply::ok(response.body),
            Ok(response) => ProxyReply::upstream_failure(GEMINI_PROVIDER, response),
            Err(e) => ProxyReply::transport_failure(GEMINI_PROVIDER, e),
        }
    }
}
