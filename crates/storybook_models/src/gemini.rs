//! Gemini REST client (`generateContent` and Imagen `predict`).

use crate::{ProviderTransport, UpstreamRequest, UpstreamResponse};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use storybook_core::ImageResult;
use storybook_error::{ProviderError, ProviderErrorKind};
use tracing::{debug, instrument};

/// Public Gemini endpoint.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Model used for story text and key validation.
pub const GEMINI_TEXT_MODEL: &str = "gemini-2.0-flash";

/// Model used for page illustrations.
pub const GEMINI_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Model used by the Imagen engine.
pub const IMAGEN_MODEL: &str = "imagen-3.0-generate-002";

/// Provider label used in error messages.
pub const GEMINI_PROVIDER: &str = "Gemini";

/// Body of a `generateContent` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct GenerateContentRequest {
    /// Conversation contents
    contents: Vec<Value>,
    /// Generation settings (`responseMimeType`, `responseSchema`, `imageConfig`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    generation_config: Option<Value>,
}

impl GenerateContentRequest {
    /// Creates a new builder.
    pub fn builder() -> GenerateContentRequestBuilder {
        GenerateContentRequestBuilder::default()
    }

    /// A single user turn containing `prompt`.
    pub fn from_prompt(prompt: &str, generation_config: Option<Value>) -> Self {
        Self {
            contents: normalize_contents(Value::String(prompt.to_string())),
            generation_config,
        }
    }
}

/// Coerce `contents` into the array form the REST API expects.
///
/// A string becomes one user turn, a single content object is wrapped,
/// and arrays pass through unchanged.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use storybook_models::normalize_contents;
///
/// let contents = normalize_contents(json!("Hi"));
/// assert_eq!(contents, vec![json!({"role": "user", "parts": [{"text": "Hi"}]})]);
///
/// let contents = normalize_contents(json!([{"parts": [{"text": "a"}]}]));
/// assert_eq!(contents.len(), 1);
/// ```
pub fn normalize_contents(contents: Value) -> Vec<Value> {
    match contents {
        Value::Array(items) => items,
        Value::String(text) => vec![json!({"role": "user", "parts": [{"text": text}]})],
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Typed view of a `generateContent` response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidate answers
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One candidate answer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Candidate content; missing when the answer was blocked
    #[serde(default)]
    pub content: Option<Content>,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content of a candidate.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Ordered parts
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A text or inline-data part.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text payload
    #[serde(default)]
    pub text: Option<String>,
    /// Binary payload
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

/// Base64 data with its MIME type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    /// Base64 payload
    pub data: String,
}

fn default_mime_type() -> String {
    "image/png".to_string()
}

impl GenerateContentResponse {
    /// Decode a response body.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderErrorKind::InvalidResponse`] if the body has the wrong shape.
    pub fn from_value(body: &Value) -> Result<Self, ProviderError> {
        serde_json::from_value(body.clone()).map_err(|e| {
            ProviderError::new(ProviderErrorKind::InvalidResponse(format!(
                "Unexpected generateContent response: {}",
                e
            )))
        })
    }

    /// Text of the first part of the first candidate.
    ///
    /// # Errors
    ///
    /// [`ProviderErrorKind::EmptyCandidates`] when there are no candidates,
    /// [`ProviderErrorKind::InvalidResponse`] when the first part has no text.
    pub fn first_text(&self) -> Result<&str, ProviderError> {
        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| ProviderError::new(ProviderErrorKind::EmptyCandidates))?;
        candidate
            .content
            .as_ref()
            .and_then(|content| content.parts.first())
            .and_then(|part| part.text.as_deref())
            .ok_or_else(|| {
                ProviderError::new(ProviderErrorKind::InvalidResponse(
                    "First candidate has no text".to_string(),
                ))
            })
    }

    /// First inline image of the first candidate.
    ///
    /// When no part carries image data, the concatenated text parts are
    /// returned as the refusal reason.
    ///
    /// # Errors
    ///
    /// [`ProviderErrorKind::EmptyCandidates`] when there are no candidates,
    /// [`ProviderErrorKind::NoImage`] when no part carries image data.
    pub fn first_image(&self) -> Result<ImageResult, ProviderError> {
        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| ProviderError::new(ProviderErrorKind::EmptyCandidates))?;

        let parts = candidate
            .content
            .as_ref()
            .map(|content| content.parts.as_slice())
            .unwrap_or_default();

        let mut refusal = String::new();
        for part in parts {
            if let Some(inline) = &part.inline_data {
                return Ok(ImageResult::inline(&inline.mime_type, &inline.data));
            }
            if let Some(text) = &part.text {
                refusal.push_str(text);
            }
        }

        let reason = if refusal.trim().is_empty() {
            candidate
                .finish_reason
                .clone()
                .unwrap_or_else(|| "no image data in response".to_string())
        } else {
            refusal
        };
        Err(ProviderError::new(ProviderErrorKind::NoImage(reason)))
    }
}

/// First prediction of an Imagen `predict` response.
///
/// # Errors
///
/// [`ProviderErrorKind::NoImage`] when there is no encoded image.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use storybook_models::imagen_image;
///
/// let body = json!({"predictions": [{"bytesBase64Encoded": "AAAA", "mimeType": "image/png"}]});
/// assert_eq!(imagen_image(&body).unwrap().to_reference(), "data:image/png;base64,AAAA");
/// ```
pub fn imagen_image(body: &Value) -> Result<ImageResult, ProviderError> {
    let prediction = body.pointer("/predictions/0");
    let data = prediction
        .and_then(|p| p.get("bytesBase64Encoded"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ProviderError::new(ProviderErrorKind::NoImage(
                "Imagen returned no predictions".to_string(),
            ))
        })?;
    let mime_type = prediction
        .and_then(|p| p.get("mimeType"))
        .and_then(Value::as_str)
        .unwrap_or("image/png");
    Ok(ImageResult::inline(mime_type, data))
}

/// Gemini REST client over a [`ProviderTransport`].
///
/// Calls return the raw upstream response so callers can relay it; typed
/// helpers decode successful bodies.
#[derive(Clone)]
pub struct GeminiClient {
    transport: Arc<dyn ProviderTransport>,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiClient {
    /// Client for the public endpoint.
    pub fn new(transport: Arc<dyn ProviderTransport>) -> Self {
        Self::with_base_url(transport, GEMINI_API_BASE)
    }

    /// Client for a custom endpoint (test servers, regional gateways).
    pub fn with_base_url(transport: Arc<dyn ProviderTransport>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
        }
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }

    /// Call `models/{model}:generateContent`.
    ///
    /// # Errors
    ///
    /// Only transport failures are errors; upstream error statuses are
    /// returned in the response.
    #[instrument(skip(self, api_key, request))]
    pub async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<UpstreamResponse, ProviderError> {
        debug!("Sending generateContent request");
        let body = serde_json::to_value(request).map_err(|e| {
            ProviderError::new(ProviderErrorKind::InvalidResponse(format!(
                "Failed to encode request: {}",
                e
            )))
        })?;
        let upstream = UpstreamRequest::new(self.model_url(model, "generateContent"), body)
            .header("x-goog-api-key", api_key);
        self.transport.post_json(upstream).await
    }

    /// Call `models/{model}:predict` for one square image.
    ///
    /// # Errors
    ///
    /// Only transport failures are errors.
    #[instrument(skip(self, api_key, prompt))]
    pub async fn predict_image(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
    ) -> Result<UpstreamResponse, ProviderError> {
        debug!("Sending predict request");
        let body = json!({
            "instances": [{"prompt": prompt}],
            "parameters": {"sampleCount": 1, "aspectRatio": "1:1"},
        });
        let upstream =
            UpstreamRequest::new(self.model_url(model, "predict"), body).header("x-goog-api-key", api_key);
        self.transport.post_json(upstream).await
    }

    /// `generateContent` that fails on non-2xx and decodes the body.
    ///
    /// # Errors
    ///
    /// Transport failures, classified upstream errors and undecodable bodies.
    pub async fn generate(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let response = self.generate_content(api_key, model, request).await?;
        if !response.is_success() {
            return Err(response.into_error(GEMINI_PROVIDER));
        }
        GenerateContentResponse::from_value(&response.body)
    }
}
