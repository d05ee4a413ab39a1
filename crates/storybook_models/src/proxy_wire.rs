//! Request bodies accepted by the provider proxy endpoints.
//!
//! The optional `apiKey` is a caller override; when absent the proxy uses
//! its configured key.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `kind` of a proxy error reply sent when the provider could not be reached.
///
/// The status alone (502) cannot tell a proxy-side transport failure from a
/// provider's own 502.
pub const NETWORK_FAILURE_KIND: &str = "network";

/// Body of `POST /api/proxy/gemini`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiProxyRequest {
    /// Model identifier
    pub model: String,
    /// Contents as a string, a content object or an array of content objects
    pub contents: Value,
    /// Generation settings, forwarded as `generationConfig`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    /// `"image"` trims the reply to `{ candidates }`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Caller key override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl GeminiProxyRequest {
    /// Request for `model` with `contents` and no config.
    pub fn new(model: impl Into<String>, contents: Value) -> Self {
        Self {
            model: model.into(),
            contents,
            config: None,
            kind: None,
            api_key: None,
        }
    }

    /// Sets the generation config.
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    /// Marks this as an image request.
    pub fn for_image(mut self) -> Self {
        self.kind = Some("image".to_string());
        self
    }

    /// Sets the caller key override.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// True when the reply should be trimmed to `{ candidates }`.
    pub fn is_image(&self) -> bool {
        self.kind.as_deref() == Some("image")
    }
}

/// Body of `POST /api/proxy/freepik`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreepikProxyRequest {
    /// Image prompt
    pub prompt: String,
    /// Caller key override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Body of `POST /api/proxy/imagen`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagenProxyRequest {
    /// Image prompt
    pub prompt: String,
    /// Model override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Caller key override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}
