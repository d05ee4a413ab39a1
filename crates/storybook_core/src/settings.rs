//! Process-wide settings.

use serde::{Deserialize, Serialize};

/// Image-generation engines, in order of preference.
///
/// # Examples
///
/// ```
/// use storybook_core::ImageEngine;
///
/// let engine: ImageEngine = "freepik".parse().unwrap();
/// assert_eq!(engine, ImageEngine::Freepik);
/// assert_eq!(ImageEngine::default().to_string(), "gemini");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ImageEngine {
    /// Gemini image model (primary)
    #[default]
    Gemini,
    /// Freepik text-to-image (secondary)
    Freepik,
    /// Imagen predict endpoint (tertiary)
    Imagen,
}

/// Outcome of checking a provider key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the key was accepted
    pub valid: bool,
    /// Human-readable detail
    pub message: String,
}

impl ValidationResult {
    /// An accepted key.
    pub fn valid(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: message.into(),
        }
    }

    /// A rejected key.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

fn default_brand_name() -> String {
    "StoryAI".to_string()
}

fn default_brand_logo() -> String {
    "BookOpen".to_string()
}

/// User settings persisted locally as a single blob.
///
/// Unknown or missing fields fall back to defaults so older blobs still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Brand name shown in the header
    #[serde(default = "default_brand_name")]
    pub brand_name: String,
    /// Built-in logo icon name
    #[serde(default = "default_brand_logo")]
    pub brand_logo: String,
    /// Uploaded logo (usually a `data:` URL, may be large)
    #[serde(default)]
    pub brand_logo_url: String,
    /// Selected image engine
    #[serde(default)]
    pub image_engine: ImageEngine,
    /// Engines tried, in order, when the selected one fails
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_engines: Vec<ImageEngine>,
    /// User override for the Gemini key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    /// User override for the Freepik key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freepik_api_key: Option<String>,
    /// Last key validation outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_validation: Option<ValidationResult>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            brand_name: default_brand_name(),
            brand_logo: default_brand_logo(),
            brand_logo_url: String::new(),
            image_engine: ImageEngine::default(),
            fallback_engines: Vec::new(),
            gemini_api_key: None,
            freepik_api_key: None,
            last_validation: None,
        }
    }
}

impl Settings {
    /// The part of these settings shared through the server record.
    pub fn shared(&self) -> SharedSettings {
        SharedSettings {
            brand_name: self.brand_name.clone(),
            brand_logo: self.brand_logo.clone(),
            brand_logo_url: self.brand_logo_url.clone(),
            image_engine: self.image_engine,
        }
    }

    /// Overlay a server record onto local settings, keeping local keys.
    pub fn merge_shared(&mut self, shared: &SharedSettings) {
        self.brand_name = shared.brand_name.clone();
        self.brand_logo = shared.brand_logo.clone();
        self.brand_logo_url = shared.brand_logo_url.clone();
        self.image_engine = shared.image_engine;
    }

    /// Engines to try, selected engine first, without duplicates.
    pub fn engine_chain(&self) -> Vec<ImageEngine> {
        let mut chain = vec![self.image_engine];
        for engine in &self.fallback_engines {
            if !chain.contains(engine) {
                chain.push(*engine);
            }
        }
        chain
    }
}

/// The single global settings record stored on the server.
///
/// Provider keys are never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedSettings {
    /// Brand name
    pub brand_name: String,
    /// Built-in logo icon name
    pub brand_logo: String,
    /// Uploaded logo
    #[serde(default)]
    pub brand_logo_url: String,
    /// Selected image engine
    #[serde(default)]
    pub image_engine: ImageEngine,
}

impl Default for SharedSettings {
    fn default() -> Self {
        Settings::default().shared()
    }
}
