//! Image generation results.

use serde::{Deserialize, Serialize};

/// What an image generator hands back: inline bytes or a hosted URL.
///
/// # Examples
///
/// ```
/// use storybook_core::ImageResult;
///
/// let inline = ImageResult::inline("image/png", "iVBORw0KGgo=");
/// assert_eq!(inline.to_reference(), "data:image/png;base64,iVBORw0KGgo=");
///
/// let hosted = ImageResult::hosted("https://cdn.example.com/p1.png");
/// assert_eq!(hosted.to_reference(), "https://cdn.example.com/p1.png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ImageResult {
    /// Base64-encoded image data
    Inline {
        /// MIME type of the encoded image
        mime_type: String,
        /// Base64 payload
        data: String,
    },
    /// URL served by the provider
    Hosted {
        /// Image URL
        url: String,
    },
}

impl ImageResult {
    /// Inline image with the given MIME type.
    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Inline {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Hosted image at `url`.
    pub fn hosted(url: impl Into<String>) -> Self {
        Self::Hosted { url: url.into() }
    }

    /// The reference stored on a page: a `data:` URL or the hosted URL.
    pub fn to_reference(&self) -> String {
        match self {
            ImageResult::Inline { mime_type, data } => {
                format!("data:{};base64,{}", mime_type, data)
            }
            ImageResult::Hosted { url } => url.clone(),
        }
    }
}
