// Provider proxy relay behavior against a scripted upstream.

mod test_utils;

use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use storybook_models::{FreepikProxyRequest, GeminiProxyRequest};
use storybook_server::{ProviderProxy, ProxyKeys};
use test_utils::{MockReply, MockTransport, send, test_app};

fn server_keys() -> ProxyKeys {
    ProxyKeys {
        gemini: Some("server-gemini".to_string()),
        freepik: Some("server-freepik".to_string()),
    }
}

#[tokio::test]
async fn missing_key_fails_without_calling_upstream() {
    let transport = Arc::new(MockTransport::ok(json!({})));
    let app = test_app(transport.clone(), ProxyKeys::default());

    let (status, body) = send(
        &app,
        "POST",
        "/api/proxy/gemini",
        Some(json!({"model": "gemini-2.0-flash", "contents": "Hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Gemini API key not configured on server");

    let (status, body) = send(&app, "POST", "/api/proxy/freepik", Some(json!({"prompt": "fox"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Freepik API key not configured on server");

    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn caller_key_overrides_server_key() {
    let transport = Arc::new(MockTransport::ok(json!({"candidates": []})));
    let proxy = ProviderProxy::new(transport.clone(), server_keys());

    proxy
        .gemini(GeminiProxyRequest::new("gemini-2.0-flash", json!("Hi")).with_api_key(Some("mine".to_string())))
        .await;
    proxy
        .gemini(GeminiProxyRequest::new("gemini-2.0-flash", json!("Hi")).with_api_key(Some("  ".to_string())))
        .await;

    let sent = transport.requests();
    assert_eq!(sent[0].header_value("x-goog-api-key"), Some("mine"));
    assert_eq!(sent[1].header_value("x-goog-api-key"), Some("server-gemini"));
}

#[tokio::test]
async fn gemini_request_is_normalized() {
    let transport = Arc::new(MockTransport::ok(json!({"candidates": [], "usageMetadata": {}})));
    let app = test_app(transport.clone(), server_keys());

    let (status, body) = send(
        &app,
        "POST",
        "/api/proxy/gemini",
        Some(json!({
            "model": "gemini-2.0-flash",
            "contents": "Tell a story",
            "config": {"responseMimeType": "application/json"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("usageMetadata").is_some());

    let sent = &transport.requests()[0];
    assert!(sent.url.ends_with("/v1beta/models/gemini-2.0-flash:generateContent"));
    assert_eq!(sent.body["contents"][0]["parts"][0]["text"], "Tell a story");
    assert_eq!(sent.body["generationConfig"]["responseMimeType"], "application/json");
}

#[tokio::test]
async fn image_requests_return_only_candidates() {
    let upstream = json!({
        "candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "AAAA"}}]}}],
        "usageMetadata": {"totalTokenCount": 10}
    });
    let proxy = ProviderProxy::new(Arc::new(MockTransport::ok(upstream.clone())), server_keys());

    let reply = proxy
        .gemini(GeminiProxyRequest::new("gemini-2.5-flash-image", json!({"parts": [{"text": "fox"}]})).for_image())
        .await;
    assert!(reply.is_success());
    assert_eq!(reply.body, json!({"candidates": upstream["candidates"]}));
}

#[tokio::test]
async fn upstream_errors_are_relayed_with_status() {
    let upstream = json!({"error": {"code": 403, "message": "Your API key was reported as leaked."}});
    let transport = Arc::new(MockTransport::new(vec![MockReply::Respond(403, upstream.clone())]));
    let app = test_app(transport, server_keys());

    let (status, body) = send(
        &app,
        "POST",
        "/api/proxy/gemini",
        Some(json!({"model": "gemini-2.0-flash", "contents": "Hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Your API key was reported as leaked.");
    assert_eq!(body["details"], upstream);
}

#[tokio::test]
async fn transport_failure_is_bad_gateway() {
    let transport = Arc::new(MockTransport::new(vec![MockReply::Fail("connection refused".to_string())]));
    let proxy = ProviderProxy::new(transport, server_keys());

    let reply = proxy
        .freepik(FreepikProxyRequest {
            prompt: "fox".to_string(),
            api_key: None,
        })
        .await;
    assert_eq!(reply.status, 502);
    assert!(reply.body["error"].as_str().unwrap().contains("connection refused"));
    assert_eq!(reply.body["kind"], "network");
}

#[tokio::test]
async fn freepik_request_uses_fixed_parameters() {
    let transport = Arc::new(MockTransport::ok(json!({"data": [{"base64": "QUJD"}]})));
    let app = test_app(transport.clone(), server_keys());

    let (status, body) = send(&app, "POST", "/api/proxy/freepik", Some(json!({"prompt": "a fox"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["base64"], "QUJD");

    let sent = &transport.requests()[0];
    assert!(sent.url.ends_with("/v1/ai/text-to-image"));
    assert_eq!(sent.header_value("x-freepik-api-key"), Some("server-freepik"));
    assert_eq!(sent.body["num_images"], 1);
    assert_eq!(sent.body["image"]["size"], "square_1_1");
    assert_eq!(sent.body["styling"]["style"], "cartoon");
}

#[tokio::test]
async fn imagen_uses_predict_with_default_model() {
    let transport = Arc::new(MockTransport::ok(json!({"predictions": [{"bytesBase64Encoded": "QUJD"}]})));
    let app = test_app(transport.clone(), server_keys());

    let (status, _) = send(&app, "POST", "/api/proxy/imagen", Some(json!({"prompt": "a fox"}))).await;
    assert_eq!(status, StatusCode::OK);

    let sent = &transport.requests()[0];
    assert!(sent.url.ends_with("/v1beta/models/imagen-3.0-generate-002:predict"));
    assert_eq!(sent.body["instances"][0]["prompt"], "a fox");
    assert_eq!(sent.body["parameters"]["sampleCount"], 1);
}
