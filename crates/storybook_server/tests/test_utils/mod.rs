//! Test utilities for server tests.

pub mod mock_transport;

#[allow(unused_imports)]
pub use mock_transport::{MockReply, MockTransport};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use storybook_database::{InMemoryBookRepository, InMemorySettingsRepository};
use storybook_server::{AppState, DEFAULT_BODY_LIMIT, ProviderProxy, ProxyKeys, build_router};
use tower::ServiceExt;

/// Router over in-memory storage and a scripted upstream.
#[allow(dead_code)]
pub fn test_app(transport: Arc<MockTransport>, keys: ProxyKeys) -> Router {
    let state = AppState::new(
        Arc::new(InMemoryBookRepository::new()),
        Arc::new(InMemorySettingsRepository::new()),
        ProviderProxy::new(transport, keys),
    );
    build_router(state, DEFAULT_BODY_LIMIT)
}

/// Send one request and decode the JSON reply.
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
