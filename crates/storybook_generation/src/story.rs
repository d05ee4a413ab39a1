//! Story drafting through the Gemini proxy.

use crate::ProxyClient;
use async_trait::async_trait;
use serde_json::{Value, json};
use storybook_core::{DEFAULT_PAGE_COUNT, StoryDraft, StoryRequest};
use storybook_error::{GenerationError, GenerationErrorKind, StorybookResult};
use storybook_interface::StoryGenerator;
use storybook_models::{GEMINI_TEXT_MODEL, GeminiProxyRequest, GenerateContentResponse};
use tracing::{debug, instrument, warn};

/// Prompt asking the text model for a full story outline.
pub fn story_prompt(request: &StoryRequest) -> String {
    format!(
        "Create a children's storybook outline with {pages} pages.
Genre: {genre}
Theme: {theme}
Main Character: {character} (Type: {character_type})
Target Age: {age}
Moral Value: {moral}
Language: {language}

For each page, provide:
1. The story text (simple, engaging, 50-80 words).
2. A detailed image prompt for a consistent illustration.
Illustration Style: {style}
The image prompt MUST describe the character's appearance (hair, clothes, expression) to maintain consistency.
Style details: {style}, bright, cute.

Return the response in JSON format.
IMPORTANT: The story text MUST be in {language}.",
        pages = DEFAULT_PAGE_COUNT,
        genre = request.genre,
        theme = request.theme,
        character = request.main_character,
        character_type = request.character_type,
        age = request.target_age,
        moral = request.moral_value,
        language = request.language,
        style = request.illustration_style,
    )
}

/// JSON schema the text model must answer with.
pub fn story_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {"type": "STRING"},
            "pages": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "pageNumber": {"type": "INTEGER"},
                        "content": {"type": "STRING"},
                        "imagePrompt": {"type": "STRING"}
                    },
                    "required": ["pageNumber", "content", "imagePrompt"]
                }
            }
        },
        "required": ["title", "pages"]
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Decode and validate the model's story JSON.
///
/// Pages come back sorted by page number. A page count other than
/// [`DEFAULT_PAGE_COUNT`] is accepted with a warning.
///
/// # Errors
///
/// [`GenerationErrorKind::MalformedStory`] for undecodable text and
/// [`GenerationErrorKind::InvalidDraft`] for structural problems.
///
/// # Examples
///
/// ```
/// use storybook_generation::parse_story_draft;
///
/// let draft = parse_story_draft(
///     r#"{"title":"T","pages":[{"pageNumber":2,"content":"b","imagePrompt":"b"},
///                             {"pageNumber":1,"content":"a","imagePrompt":"a"}]}"#,
/// ).unwrap();
/// assert_eq!(draft.pages[0].page_number, 1);
///
/// assert!(parse_story_draft("{}").is_err());
/// ```
pub fn parse_story_draft(text: &str) -> StorybookResult<StoryDraft> {
    let mut draft: StoryDraft = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| GenerationError::new(GenerationErrorKind::MalformedStory(e.to_string())))?;
    draft
        .validate()
        .map_err(|message| GenerationError::new(GenerationErrorKind::InvalidDraft(message)))?;
    if draft.pages.len() != DEFAULT_PAGE_COUNT {
        warn!(
            pages = draft.pages.len(),
            expected = DEFAULT_PAGE_COUNT,
            "Story draft has an unexpected page count"
        );
    }
    draft.sort_pages();
    Ok(draft)
}

/// [`StoryGenerator`] that asks the text model through the proxy.
#[derive(Debug, Clone)]
pub struct ProxyStoryGenerator {
    client: ProxyClient,
    model: String,
}

impl ProxyStoryGenerator {
    /// Generator using the default text model.
    pub fn new(client: ProxyClient) -> Self {
        Self {
            client,
            model: GEMINI_TEXT_MODEL.to_string(),
        }
    }

    /// Overrides the text model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl StoryGenerator for ProxyStoryGenerator {
    #[instrument(skip(self, request), fields(theme = %request.theme, language = %request.language))]
    async fn generate_story(&self, request: &StoryRequest) -> StorybookResult<StoryDraft> {
        let proxy_request = GeminiProxyRequest::new(
            self.model.clone(),
            json!([{"parts": [{"text": story_prompt(request)}]}]),
        )
        .with_config(json!({
            "responseMimeType": "application/json",
            "responseSchema": story_response_schema(),
        }));

        let body = self.client.gemini(proxy_request).await?;
        let response = GenerateContentResponse::from_value(&body)?;
        let draft = parse_story_draft(response.first_text()?)?;
        debug!(title = %draft.title, pages = draft.pages.len(), "Story drafted");
        Ok(draft)
    }
}
