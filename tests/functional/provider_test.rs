//! Functional tests for the Gemini provider against a mock HTTP server

use serde_json::json;
use std::sync::Arc;
use tryon_studio::config::{ProviderConfig, Settings};
use tryon_studio::error::AppError;
use tryon_studio::image::SourceFile;
use tryon_studio::provider::gemini::INVALID_API_KEY_MESSAGE;
use tryon_studio::provider::{GeminiProvider, GenerationProvider};
use tryon_studio::tryon::{extract, Orchestrator, TryOnOutcome, TryOnRequest, TryOnStatus};
use tryon_studio::upload::UploadedImage;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash-image-preview:generateContent";

fn provider_for(server: &MockServer) -> GeminiProvider {
    let config = ProviderConfig {
        api_key: Some("test-key".to_string()),
        api_base: format!("{}/v1beta", server.uri()),
        ..Settings::default().provider
    };
    GeminiProvider::new(&config).unwrap()
}

async fn sample_request() -> TryOnRequest {
    let person = SourceFile::new("me.png", "image/png", vec![1]);
    let outfit = SourceFile::new("shirt.jpg", "image/jpeg", vec![2]);
    TryOnRequest::build(&person, &[outfit]).await.unwrap()
}

#[tokio::test]
async fn test_request_wire_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": "AQ==" } },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "Ag==" } },
                    { "text": tryon_studio::tryon::TRY_ON_INSTRUCTION }
                ]
            }],
            "generationConfig": { "responseModalities": ["IMAGE", "TEXT"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is the outfit" },
                        { "inlineData": { "mimeType": "image/png", "data": "AAAA" } }
                    ]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let response = provider.generate(&sample_request().await).await.unwrap();

    match extract(&response) {
        TryOnOutcome::Image(artifact) => assert_eq!(artifact.data_uri(), "data:image/png;base64,AAAA"),
        TryOnOutcome::NoImageFound => panic!("expected an image"),
    }
}

#[tokio::test]
async fn test_invalid_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .generate(&sample_request().await)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidCredential(_)));
    assert_eq!(err.to_string(), INVALID_API_KEY_MESSAGE);
}

#[tokio::test]
async fn test_provider_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED" }
        })))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .generate(&sample_request().await)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Resource has been exhausted");
}

#[tokio::test]
async fn test_malformed_response_is_a_fault() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .generate(&sample_request().await)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Provider(_)));
}

#[tokio::test]
async fn test_end_to_end_through_orchestrator() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [ { "inlineData": { "mimeType": "image/png", "data": "AAAA" } } ] }
            }]
        })))
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(Arc::new(provider_for(&server)));
    let person = UploadedImage {
        file: SourceFile::new("me.png", "image/png", vec![1]),
        preview_url: String::new(),
    };
    let outfit = UploadedImage {
        file: SourceFile::new("shirt.png", "image/png", vec![2]),
        preview_url: String::new(),
    };

    let state = orchestrator.trigger(Some(&person), &[outfit]).await.unwrap();

    assert_eq!(state.status, TryOnStatus::Success);
    assert_eq!(state.result.unwrap().data_uri(), "data:image/png;base64,AAAA");
}

#[tokio::test]
async fn test_unreachable_provider_fails_state() {
    let config = ProviderConfig {
        api_key: Some("test-key".to_string()),
        api_base: "http://127.0.0.1:1/v1beta".to_string(),
        ..Settings::default().provider
    };
    let orchestrator = Orchestrator::new(Arc::new(GeminiProvider::new(&config).unwrap()));
    let image = UploadedImage {
        file: SourceFile::new("me.png", "image/png", vec![1]),
        preview_url: String::new(),
    };

    let state = orchestrator
        .trigger(Some(&image), &[image.clone()])
        .await
        .unwrap();

    assert_eq!(state.status, TryOnStatus::Failed);
    assert!(state
        .error
        .unwrap()
        .starts_with("Failed to reach the image provider"));
    assert!(!orchestrator.is_loading());
}
