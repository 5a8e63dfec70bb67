//! Functional tests for the studio HTTP API

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use tryon_studio::api::routes::create_router;
use tryon_studio::config::Settings;
use tryon_studio::error::Result;
use tryon_studio::provider::{Candidate, GenerationProvider, ProviderResponse, ResponsePart};
use tryon_studio::studio::Studio;
use tryon_studio::tryon::TryOnRequest;
use tryon_studio::AppState;

const BOUNDARY: &str = "tryon-test-boundary";

/// Always answers with one PNG whose payload is "AAAA"
struct StaticProvider;

#[async_trait]
impl GenerationProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn model(&self) -> &str {
        "static-model"
    }

    async fn generate(&self, _request: &TryOnRequest) -> Result<ProviderResponse> {
        Ok(ProviderResponse {
            candidates: vec![Candidate::with_parts(vec![ResponsePart::image(
                "image/png",
                "AAAA",
            )])],
        })
    }
}

fn create_test_app() -> Router {
    let state = Arc::new(AppState {
        settings: Arc::new(Settings::default()),
        studio: Arc::new(Studio::new(Arc::new(StaticProvider))),
    });
    create_router(state)
}

fn multipart_body(files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, content_type, bytes) in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n",
                name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload(uri: &str, files: &[(&str, &str, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(files)))
        .unwrap()
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn json_of(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app();
    let (status, body) = json_of(&app, request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_initial_studio_is_idle() {
    let app = create_test_app();
    let (status, body) = json_of(&app, request("GET", "/v1/studio")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["status"], "idle");
    assert_eq!(body["can_try_on"], false);
    assert_eq!(body["person"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_person_upload_keeps_one_image() {
    let app = create_test_app();
    let (status, body) = json_of(
        &app,
        upload(
            "/v1/person",
            &[("a.png", "image/png", "a".as_bytes()), ("b.png", "image/png", "b".as_bytes())],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let person = body["person"].as_array().unwrap();
    assert_eq!(person.len(), 1);
    assert_eq!(person[0]["name"], "a.png");
    assert_eq!(person[0]["preview_url"], "data:image/png;base64,YQ==");
}

#[tokio::test]
async fn test_outfit_upload_appends_and_removes() {
    let app = create_test_app();
    json_of(&app, upload("/v1/outfits", &[("a.png", "image/png", "a".as_bytes())])).await;
    let (_, body) = json_of(&app, upload("/v1/outfits", &[("b.png", "image/png", "b".as_bytes())])).await;
    assert_eq!(body["outfits"].as_array().unwrap().len(), 2);

    let (status, body) = json_of(&app, request("DELETE", "/v1/outfits/0")).await;

    assert_eq!(status, StatusCode::OK);
    let outfits = body["outfits"].as_array().unwrap();
    assert_eq!(outfits.len(), 1);
    assert_eq!(outfits[0]["name"], "b.png");
    assert_eq!(outfits[0]["index"], 0);
}

#[tokio::test]
async fn test_try_on_without_person_fails_validation() {
    let app = create_test_app();
    json_of(&app, upload("/v1/outfits", &[("a.png", "image/png", "a".as_bytes())])).await;

    let (status, body) = json_of(&app, request("POST", "/v1/try-on")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "failed");
    assert_eq!(
        body["error"],
        "Please upload your photo and at least one outfit image."
    );

    let (status, _) = json_of(&app, request("GET", "/v1/result")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_try_on_success_and_download() {
    let app = create_test_app();
    json_of(&app, upload("/v1/person", &[("me.png", "image/png", "me".as_bytes())])).await;
    let (_, body) = json_of(&app, upload("/v1/outfits", &[("shirt.png", "image/png", "shirt".as_bytes())])).await;
    assert_eq!(body["can_try_on"], true);

    let (status, body) = json_of(&app, request("POST", "/v1/try-on")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (status, body) = json_of(&app, request("GET", "/v1/result")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_uri"], "data:image/png;base64,AAAA");
    assert_eq!(body["file_name"], "virtual-try-on.png");

    let response = app
        .clone()
        .oneshot(request("GET", "/v1/result/download"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"virtual-try-on.png\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], &[0u8, 0, 0]);
}

#[tokio::test]
async fn test_reset_clears_session() {
    let app = create_test_app();
    json_of(&app, upload("/v1/person", &[("me.png", "image/png", "me".as_bytes())])).await;

    let (status, body) = json_of(&app, request("DELETE", "/v1/studio")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["person"].as_array().unwrap().len(), 0);
    assert_eq!(body["state"]["status"], "idle");
}

#[tokio::test]
async fn test_non_multipart_upload_rejected() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/person")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}
