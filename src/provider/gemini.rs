//! Gemini `generateContent` provider client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::error::{AppError, Result};
use crate::image::EncodedImagePart;
use crate::provider::traits::{GenerationProvider, ProviderResponse};
use crate::tryon::request::{RequestPart, ResponseModality, TryOnRequest};

/// Shown instead of the provider's own wording when the key is rejected.
pub const INVALID_API_KEY_MESSAGE: &str =
    "The provided API key is not valid. Please check your environment configuration.";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for Gemini image-capable models
pub struct GeminiProvider {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerateRequest<'a> {
    contents: Vec<ApiContent<'a>>,
    generation_config: ApiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct ApiContent<'a> {
    role: &'static str,
    parts: Vec<ApiPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiPart<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<&'a EncodedImagePart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    response_modalities: Vec<&'static str>,
}

/// Error envelope returned with non-success statuses
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

impl GeminiProvider {
    /// Create a provider from configuration. The credential must already be
    /// resolved.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config.api_key()?.to_string();

        let mut builder = Client::builder();
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim().trim_end_matches('/').to_string(),
            api_key,
            model: config.model.trim().to_string(),
        })
    }

    /// Full `generateContent` URL for the configured model
    pub fn endpoint(&self) -> String {
        let model_path = if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    fn build_body<'a>(request: &'a TryOnRequest) -> ApiGenerateRequest<'a> {
        let parts = request
            .parts()
            .iter()
            .map(|part| match part {
                RequestPart::InlineImage(image) => ApiPart {
                    inline_data: Some(image),
                    text: None,
                },
                RequestPart::Text(text) => ApiPart {
                    inline_data: None,
                    text: Some(text.as_str()),
                },
            })
            .collect();

        let response_modalities = request
            .response_modalities()
            .iter()
            .map(|modality| match modality {
                ResponseModality::Image => "IMAGE",
                ResponseModality::Text => "TEXT",
            })
            .collect();

        ApiGenerateRequest {
            contents: vec![ApiContent { role: "user", parts }],
            generation_config: ApiGenerationConfig {
                response_modalities,
            },
        }
    }

    /// Turn a non-success body into the fault shown to the user
    fn fault_from_body(status: reqwest::StatusCode, body: &str) -> AppError {
        let message = serde_json::from_str::<ApiErrorResponse>(body)
            .map(|e| e.error.message)
            .unwrap_or_default();

        if message.contains("API key not valid") {
            return AppError::InvalidCredential(INVALID_API_KEY_MESSAGE.to_string());
        }

        if message.trim().is_empty() {
            AppError::Provider(format!("Provider returned {}", status))
        } else {
            AppError::Provider(message)
        }
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &TryOnRequest) -> Result<ProviderResponse> {
        let url = self.endpoint();
        let body = Self::build_body(request);

        debug!(
            provider = %self.name(),
            model = %self.model,
            parts = body.contents[0].parts.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(provider = %self.name(), error = %e, "Provider request failed");
                AppError::Provider(format!("Failed to reach the image provider: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(provider = %self.name(), status = %status, "Provider returned an error");
            return Err(Self::fault_from_body(status, &body));
        }

        let parsed = response.json::<ProviderResponse>().await.map_err(|e| {
            AppError::Provider(format!("Failed to parse provider response: {}", e))
        })?;

        debug!(
            provider = %self.name(),
            candidates = parsed.candidates.len(),
            "Received generateContent response"
        );

        Ok(parsed)
    }
}
