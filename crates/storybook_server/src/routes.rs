//! HTTP routes.
//!
//! ```text
//! GET    /health
//! GET    /api/books?sortBy=&order=     list summaries
//! POST   /api/books                    create (201 { success, id })
//! DELETE /api/books                    delete all ({ success, deleted })
//! GET    /api/books/:id                book with pages
//! PUT    /api/books/:id                replace descriptive fields
//! PATCH  /api/books/:id                partial update, optional page set
//! DELETE /api/books/:id                idempotent delete
//! GET    /api/settings                 shared settings record
//! PUT    /api/settings                 replace shared settings record
//! POST   /api/proxy/gemini             Gemini generateContent
//! POST   /api/proxy/freepik            Freepik text-to-image
//! POST   /api/proxy/imagen             Imagen predict
//! ```

use crate::{ApiError, AppState, ProxyReply};
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use storybook_core::{Book, BookPatch, BookSummary, BookUpdate, ListQuery, SharedSettings};
use storybook_models::{FreepikProxyRequest, GeminiProxyRequest, ImagenProxyRequest};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

/// Build the application router.
pub fn build_router(state: AppState, body_limit: usize) -> Router {
    let books = Router::new()
        .route(
            "/api/books",
            get(list_books).post(create_book).delete(delete_all_books),
        )
        .route(
            "/api/books/:id",
            get(get_book)
                .put(replace_book)
                .patch(update_book)
                .delete(delete_book),
        );

    let settings = Router::new().route("/api/settings", get(get_settings).put(put_settings));

    let proxy = Router::new()
        .route("/api/proxy/gemini", post(proxy_gemini))
        .route("/api/proxy/freepik", post(proxy_freepik))
        .route("/api/proxy/imagen", post(proxy_imagen));

    Router::new()
        .route("/health", get(health))
        .merge(books)
        .merge(settings)
        .merge(proxy)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

#[instrument(skip(state))]
async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<BookSummary>>, ApiError> {
    Ok(Json(state.books.list_books(&query).await?))
}

#[instrument(skip(state, book), fields(book_id = %book.id, pages = book.pages.len()))]
async fn create_book(
    State(state): State<AppState>,
    Json(book): Json<Book>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let id = state.books.create_book(&book).await?;
    info!(book_id = %id, "Book saved");
    Ok((StatusCode::CREATED, Json(json!({"success": true, "id": id}))))
}

#[instrument(skip(state))]
async fn delete_all_books(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let deleted = state.books.delete_all_books().await?;
    info!(deleted, "All books deleted");
    Ok(Json(json!({"success": true, "deleted": deleted})))
}

#[instrument(skip(state))]
async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    Ok(Json(state.books.get_book(&id).await?))
}

#[instrument(skip(state, update))]
async fn replace_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<BookUpdate>,
) -> Result<Json<Book>, ApiError> {
    Ok(Json(state.books.replace_book(&id, &update).await?))
}

#[instrument(skip(state, patch))]
async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<BookPatch>,
) -> Result<Json<Book>, ApiError> {
    Ok(Json(state.books.update_book(&id, &patch).await?))
}

#[instrument(skip(state))]
async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.books.delete_book(&id).await?;
    Ok(Json(json!({"success": true})))
}

#[instrument(skip(state))]
async fn get_settings(State(state): State<AppState>) -> Result<Json<SharedSettings>, ApiError> {
    let settings = state.settings.load_shared().await?.unwrap_or_default();
    Ok(Json(settings))
}

#[instrument(skip(state, settings))]
async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<SharedSettings>,
) -> Result<Json<SharedSettings>, ApiError> {
    state.settings.save_shared(&settings).await?;
    Ok(Json(settings))
}

impl IntoResponse for ProxyReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        (status, Json(self.body)).into_response()
    }
}

async fn proxy_gemini(
    State(state): State<AppState>,
    Json(request): Json<GeminiProxyRequest>,
) -> ProxyReply {
    state.proxy.gemini(request).await
}

async fn proxy_freepik(
    State(state): State<AppState>,
    Json(request): Json<FreepikProxyRequest>,
) -> ProxyReply {
    state.proxy.freepik(request).await
}

async fn proxy_imagen(
    State(state): State<AppState>,
    Json(request): Json<ImagenProxyRequest>,
) -> ProxyReply {
    state.proxy.imagen(request).await
}
