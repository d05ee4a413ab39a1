//! HTTP transport seam between provider clients and the network.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use storybook_error::{ProviderError, ProviderErrorKind};
use tracing::{debug, error, instrument};

/// A JSON `POST` to an upstream provider.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    /// Absolute URL
    pub url: String,
    /// Extra headers (API key headers live here)
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: Value,
}

impl UpstreamRequest {
    /// Request to `url` with `body` and no extra headers.
    pub fn new(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of header `name`, if present.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and JSON body of an upstream response.
///
/// Non-JSON bodies are carried as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Value,
}

impl UpstreamResponse {
    /// Response with the given status and body.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Best-effort human-readable error message from the body.
    ///
    /// Understands `{"error": {"message": ..}}`, `{"error": ".."}`,
    /// `{"message": ..}` and plain string bodies.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use storybook_models::UpstreamResponse;
    ///
    /// let response = UpstreamResponse::new(403, json!({"error": {"message": "denied"}}));
    /// assert_eq!(response.error_message(), "denied");
    ///
    /// let response = UpstreamResponse::new(500, json!(null));
    /// assert_eq!(response.error_message(), "HTTP 500");
    /// ```
    pub fn error_message(&self) -> String {
        let body = &self.body;
        body.pointer("/error/message")
            .and_then(Value::as_str)
            .or_else(|| body.get("error").and_then(Value::as_str))
            .or_else(|| body.get("message").and_then(Value::as_str))
            .or_else(|| body.as_str())
            .filter(|message| !message.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", self.status))
    }

    /// Classify a non-2xx response from `provider`.
    pub fn into_error(self, provider: &str) -> ProviderError {
        ProviderError::new(ProviderErrorKind::from_upstream(
            provider,
            self.status,
            self.error_message(),
        ))
    }
}

/// Sends JSON requests to upstream providers.
///
/// Any response that arrives, whatever its status, is `Ok`. Only failures to
/// get a response at all are errors, classified as
/// [`ProviderErrorKind::Network`].
#[async_trait]
pub trait ProviderTransport: Send + Sync {
    /// POST `request` and return the raw response.
    async fn post_json(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ProviderError>;
}

/// [`ProviderTransport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Transport with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport over an existing client (custom timeouts, proxies).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProviderTransport for HttpTransport {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn post_json(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ProviderError> {
        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| {
            error!(error = ?e, "Failed to reach upstream provider");
            ProviderError::new(ProviderErrorKind::Network(format!("Request failed: {}", e)))
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read upstream response body");
            ProviderError::new(ProviderErrorKind::Network(format!(
                "Failed to read response: {}",
                e
            )))
        })?;

        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if (200..300).contains(&status) {
            debug!(status, "Upstream request succeeded");
        } else {
            error!(status, body = %body, "Upstream provider returned error");
        }
        Ok(UpstreamResponse::new(status, body))
    }
}
