//! HTTP surface tests: routing, verb handling, and request validation.
//!
//! Requests are driven through the router in process with `tower::ServiceExt`,
//! so nothing here needs external tools or network access.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::util::ServiceExt;

use subcast::config::Config;
use subcast::server;

const BOUNDARY: &str = "X-SUBCAST-TEST-BOUNDARY";

fn app() -> Router {
    server::router(Arc::new(Config::default()))
}

/// Build a multipart/form-data body from plain text fields.
fn multipart_body(fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn multipart_post(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields)))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_ok() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("ok"));
}

#[tokio::test]
async fn test_get_subtitles_is_method_not_allowed() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/subtitles")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = body_string(response).await;
    assert!(body.contains("method not allowed"));
}

#[tokio::test]
async fn test_delete_narration_is_method_not_allowed() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/narration")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_subtitles_without_source_is_bad_request() {
    let response = app()
        .oneshot(multipart_post("/api/subtitles", &[("api_key", "sk-test")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("video upload or a video URL"));
}

#[tokio::test]
async fn test_subtitles_without_api_key_is_bad_request() {
    let response = app()
        .oneshot(multipart_post(
            "/api/subtitles",
            &[("url", "https://example.com/v")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("API key"));
}

#[tokio::test]
async fn test_narration_without_url_is_bad_request_json() {
    let response = app()
        .oneshot(multipart_post(
            "/api/narration",
            &[("api_key", "sk-test"), ("voice_api_key", "voice-test")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "bad_request");
    assert!(body["message"].as_str().unwrap().contains("URL"));
}

#[tokio::test]
async fn test_narration_without_voice_key_is_bad_request_json() {
    let response = app()
        .oneshot(multipart_post(
            "/api/narration",
            &[("url", "https://example.com/v"), ("api_key", "sk-test")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("speech synthesis API key"));
}

#[tokio::test]
async fn test_narration_key_fallback_comes_from_config() {
    // Keys in config: the missing-URL error should win, proving the fallback
    // path accepts config-provided credentials.
    let config = Config {
        openai_api_key: Some("sk-config".to_string()),
        voice_api_key: Some("voice-config".to_string()),
        ..Config::default()
    };
    let app = server::router(Arc::new(config));

    let response = app
        .oneshot(multipart_post("/api/narration", &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(body["message"].as_str().unwrap().contains("URL"));
}
