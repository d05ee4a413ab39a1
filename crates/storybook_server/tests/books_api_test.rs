// Books and settings endpoints over in-memory storage.

mod test_utils;

use axum::http::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use storybook_server::ProxyKeys;
use test_utils::{MockTransport, send, test_app};

fn book(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "theme": "friendship",
        "targetAge": "3-5",
        "moralValue": "kindness",
        "coverImageUrl": "https://img.test/cover.png",
        "pages": [
            {"pageNumber": 2, "content": "Then...", "imagePrompt": "two friends", "imageUrl": "https://img.test/2.png"},
            {"pageNumber": 1, "content": "Once...", "imagePrompt": "a kite"}
        ]
    })
}

fn app() -> axum::Router {
    test_app(Arc::new(MockTransport::ok(json!({}))), ProxyKeys::default())
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_then_fetch_book() {
    let app = app();

    let (status, body) = send(&app, "POST", "/api/books", Some(book("b1", "Kite"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"success": true, "id": "b1"}));

    let (status, body) = send(&app, "GET", "/api/books/b1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Kite");
    assert_eq!(body["pages"][0]["pageNumber"], 1);
    assert_eq!(body["pages"][1]["imageUrl"], "https://img.test/2.png");
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn duplicate_page_numbers_are_rejected() {
    let mut invalid = book("b1", "Kite");
    invalid["pages"][1]["pageNumber"] = json!(2);

    let app = app();
    let (status, body) = send(&app, "POST", "/api/books", Some(invalid)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("duplicate"));

    let (_, list) = send(&app, "GET", "/api/books", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn unknown_book_is_404() {
    let app = app();
    for method in ["GET", "PUT", "PATCH"] {
        let body = (method != "GET").then(|| {
            json!({"title": "t", "theme": "t", "targetAge": "t", "moralValue": "t"})
        });
        let (status, reply) = send(&app, method, "/api/books/missing", body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(reply, json!({"error": "Book not found"}));
    }
}

#[tokio::test]
async fn listing_sorts_and_omits_pages() {
    let app = app();
    send(&app, "POST", "/api/books", Some(book("b1", "Banana"))).await;
    send(&app, "POST", "/api/books", Some(book("b2", "Apple"))).await;

    let (status, list) = send(&app, "GET", "/api/books?sortBy=title&order=ASC", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Apple", "Banana"]);
    assert!(list[0].get("pages").is_none());

    // unknown column falls back to newest first
    let (status, list) = send(&app, "GET", "/api/books?sortBy=1;DROP&order=ASC", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["id"], "b2");
}

#[tokio::test]
async fn patch_keeps_unspecified_fields() {
    let app = app();
    send(&app, "POST", "/api/books", Some(book("b1", "Kite"))).await;

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/books/b1",
        Some(json!({"title": "New Kite", "theme": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "New Kite");
    assert_eq!(body["theme"], "friendship");
    assert_eq!(body["pages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn put_replaces_descriptive_fields() {
    let app = app();
    send(&app, "POST", "/api/books", Some(book("b1", "Kite"))).await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/books/b1",
        Some(json!({"title": "A", "theme": "B", "targetAge": "6-8", "moralValue": "C"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["targetAge"], "6-8");
    assert_eq!(body["coverImageUrl"], "https://img.test/cover.png");
}

#[tokio::test]
async fn deletes_are_idempotent() {
    let app = app();
    send(&app, "POST", "/api/books", Some(book("b1", "Kite"))).await;

    for _ in 0..2 {
        let (status, body) = send(&app, "DELETE", "/api/books/b1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));
    }
    let (status, _) = send(&app, "GET", "/api/books/b1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_all_reports_count() {
    let app = app();
    send(&app, "POST", "/api/books", Some(book("b1", "A"))).await;
    send(&app, "POST", "/api/books", Some(book("b2", "B"))).await;

    let (status, body) = send(&app, "DELETE", "/api/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "deleted": 2}));
}

#[tokio::test]
async fn settings_default_then_saved() {
    let app = app();

    let (status, body) = send(&app, "GET", "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["brandName"], "StoryAI");
    assert_eq!(body["imageEngine"], "gemini");

    let saved = json!({
        "brandName": "Dongeng",
        "brandLogo": "Sparkles",
        "brandLogoUrl": "",
        "imageEngine": "freepik"
    });
    let (status, _) = send(&app, "PUT", "/api/settings", Some(saved.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/settings", None).await;
    assert_eq!(body, saved);
    assert!(body.get("geminiApiKey").is_none());
}
