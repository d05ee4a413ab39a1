//! Persistence Gateway client: the server's books and settings API over HTTP.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use storybook_core::{Book, BookPatch, BookSummary, BookUpdate, ListQuery, SharedSettings};
use storybook_error::{
    DatabaseError, HttpError, JsonError, StorybookError, StorybookResult, ValidationError,
};
use storybook_interface::{BookRepository, SettingsRepository};
use tracing::{debug, instrument, warn};

/// Default server address.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

#[derive(Deserialize)]
struct CreatedReply {
    id: String,
}

#[derive(Deserialize)]
struct DeletedReply {
    deleted: usize,
}

#[derive(Deserialize)]
struct ErrorReply {
    error: String,
}

/// [`BookRepository`] and [`SettingsRepository`] backed by a Storybook server.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Gateway for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Gateway reusing an existing client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Server address.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of `segments` under the base URL, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> StorybookResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            HttpError::unreachable(format!("invalid server URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                HttpError::unreachable(format!("server URL '{}' cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> StorybookResult<T> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Request to server failed");
            HttpError::unreachable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorReply>()
                .await
                .map(|reply| reply.error)
                .unwrap_or_else(|_| format!("Server returned: {}", status));
            warn!(%status, error = %message, "Server rejected request");
            return Err(error_for_status(status, message));
        }

        response
            .json()
            .await
            .map_err(|e| JsonError::decode("server response", e).into())
    }
}

fn error_for_status(status: StatusCode, message: String) -> StorybookError {
    match status {
        StatusCode::NOT_FOUND => DatabaseError::not_found().into(),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ValidationError::new(message).into()
        }
        _ => HttpError::status(status.as_u16(), message).into(),
    }
}

#[async_trait]
impl BookRepository for HttpGateway {
    #[instrument(skip(self, book), fields(book_id = %book.id))]
    async fn create_book(&self, book: &Book) -> StorybookResult<String> {
        let reply: CreatedReply = self
            .send(self.client.post(self.endpoint(&["api", "books"])?).json(book))
            .await?;
        debug!("Book created");
        Ok(reply.id)
    }

    #[instrument(skip(self))]
    async fn list_books(&self, query: &ListQuery) -> StorybookResult<Vec<BookSummary>> {
        self.send(self.client.get(self.endpoint(&["api", "books"])?).query(query))
            .await
    }

    #[instrument(skip(self))]
    async fn get_book(&self, id: &str) -> StorybookResult<Book> {
        self.send(self.client.get(self.endpoint(&["api", "books", id])?))
            .await
    }

    #[instrument(skip(self, update))]
    async fn replace_book(&self, id: &str, update: &BookUpdate) -> StorybookResult<Book> {
        self.send(
            self.client
                .put(self.endpoint(&["api", "books", id])?)
                .json(update),
        )
        .await
    }

    #[instrument(skip(self, patch))]
    async fn update_book(&self, id: &str, patch: &BookPatch) -> StorybookResult<Book> {
        self.send(
            self.client
                .patch(self.endpoint(&["api", "books", id])?)
                .json(patch),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_book(&self, id: &str) -> StorybookResult<()> {
        let _: serde_json::Value = self
            .send(self.client.delete(self.endpoint(&["api", "books", id])?))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all_books(&self) -> StorybookResult<usize> {
        let reply: DeletedReply = self
            .send(self.client.delete(self.endpoint(&["api", "books"])?))
            .await?;
        Ok(reply.deleted)
    }
}

#[async_trait]
impl SettingsRepository for HttpGateway {
    #[instrument(skip(self))]
    async fn load_shared(&self) -> StorybookResult<Option<SharedSettings>> {
        let settings = self.send(self.client.get(self.endpoint(&["api", "settings"])?)).await?;
        Ok(Some(settings))
    }

    #[instrument(skip(self, settings))]
    async fn save_shared(&self, settings: &SharedSettings) -> StorybookResult<()> {
        let _: SharedSettings = self
            .send(self.client.put(self.endpoint(&["api", "settings"])?).json(settings))
            .await?;
        Ok(())
    }
}
