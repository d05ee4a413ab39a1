//! Image engines behind [`ImageGenerator`].

use crate::ProxyClient;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use storybook_core::{ImageEngine, ImageResult};
use storybook_error::{ProviderError, ProviderErrorKind, StorybookResult};
use storybook_interface::ImageGenerator;
use storybook_models::{
    GEMINI_IMAGE_MODEL, GeminiProxyRequest, GenerateContentResponse, freepik_image, imagen_image,
};
use tracing::{instrument, warn};

/// Gemini image model, one square image per prompt.
#[derive(Debug, Clone)]
pub struct GeminiImageGenerator {
    client: ProxyClient,
}

impl GeminiImageGenerator {
    /// Generator calling the proxy through `client`.
    pub fn new(client: ProxyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageGenerator {
    #[instrument(skip(self, prompt))]
    async fn generate(&self, prompt: &str) -> StorybookResult<ImageResult> {
        let request =
            GeminiProxyRequest::new(GEMINI_IMAGE_MODEL, json!({"parts": [{"text": prompt}]}))
                .with_config(json!({"imageConfig": {"aspectRatio": "1:1"}}))
                .for_image();
        let body = self.client.gemini(request).await?;
        Ok(GenerateContentResponse::from_value(&body)?.first_image()?)
    }

    fn engine(&self) -> ImageEngine {
        ImageEngine::Gemini
    }
}

/// Freepik text-to-image.
#[derive(Debug, Clone)]
pub struct FreepikImageGenerator {
    client: ProxyClient,
}

impl FreepikImageGenerator {
    /// Generator calling the proxy through `client`.
    pub fn new(client: ProxyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageGenerator for FreepikImageGenerator {
    #[instrument(skip(self, prompt))]
    async fn generate(&self, prompt: &str) -> StorybookResult<ImageResult> {
        let body = self.client.freepik(prompt).await?;
        Ok(freepik_image(&body)?)
    }

    fn engine(&self) -> ImageEngine {
        ImageEngine::Freepik
    }
}

/// Imagen `predict`.
#[derive(Debug, Clone)]
pub struct ImagenImageGenerator {
    client: ProxyClient,
}

impl ImagenImageGenerator {
    /// Generator calling the proxy through `client`.
    pub fn new(client: ProxyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageGenerator for ImagenImageGenerator {
    #[instrument(skip(self, prompt))]
    async fn generate(&self, prompt: &str) -> StorybookResult<ImageResult> {
        let body = self.client.imagen(prompt).await?;
        Ok(imagen_image(&body)?)
    }

    fn engine(&self) -> ImageEngine {
        ImageEngine::Imagen
    }
}

/// The generator for `engine`.
pub fn image_generator_for(engine: ImageEngine, client: ProxyClient) -> Arc<dyn ImageGenerator> {
    match engine {
        ImageEngine::Gemini => Arc::new(GeminiImageGenerator::new(client)),
        ImageEngine::Freepik => Arc::new(FreepikImageGenerator::new(client)),
        ImageEngine::Imagen => Arc::new(ImagenImageGenerator::new(client)),
    }
}

/// Tries engines in order until one produces an image.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use storybook_core::ImageEngine;
/// use storybook_generation::{ImageGeneratorChain, ProxyClient};
/// use storybook_models::HttpTransport;
///
/// let client = ProxyClient::new(Arc::new(HttpTransport::new()), "http://localhost:3000");
/// let chain = ImageGeneratorChain::for_engines(&[ImageEngine::Gemini, ImageEngine::Freepik], client);
/// assert_eq!(chain.len(), 2);
/// ```
#[derive(Clone)]
pub struct ImageGeneratorChain {
    generators: Vec<Arc<dyn ImageGenerator>>,
}

impl ImageGeneratorChain {
    /// Chain over `generators`, tried first to last.
    pub fn new(generators: Vec<Arc<dyn ImageGenerator>>) -> Self {
        Self { generators }
    }

    /// Chain with one generator per engine.
    pub fn for_engines(engines: &[ImageEngine], client: ProxyClient) -> Self {
        Self::new(
            engines
                .iter()
                .map(|engine| image_generator_for(*engine, client.clone()))
                .collect(),
        )
    }

    /// Number of engines in the chain.
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// True when the chain has no engines.
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

#[async_trait]
impl ImageGenerator for ImageGeneratorChain {
    async fn generate(&self, prompt: &str) -> StorybookResult<ImageResult> {
        let mut last_error = None;
        for generator in &self.generators {
            match generator.generate(prompt).await {
                Ok(image) => return Ok(image),
                Err(e) => {
                    warn!(engine = %generator.engine(), error = %e.message(), "Image engine failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            ProviderError::new(ProviderErrorKind::NoImage(
                "no image engines configured".to_string(),
            ))
            .into()
        }))
    }

    fn engine(&self) -> ImageEngine {
        self.generators
            .first()
            .map(|generator| generator.engine())
            .unwrap_or_default()
    }
}
