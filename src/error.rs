//! Common error types for the try-on studio

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Provider credential is not set (configure provider.api_key, API_KEY or GEMINI_API_KEY)")]
    MissingCredential,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing user input; the message is shown to the user as-is.
    #[error("{0}")]
    Validation(String),

    /// Rejected credential; the message is shown to the user as-is.
    #[error("{0}")]
    InvalidCredential(String),

    /// Fault reported by the provider; the message is shown to the user as-is.
    #[error("{0}")]
    Provider(String),

    #[error("A try-on request is already in progress")]
    RequestInFlight,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response format
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    pub code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code) = match &self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
            AppError::MissingCredential => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", Some("missing_credential")),
            AppError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
            AppError::Multipart(_) => (StatusCode::BAD_REQUEST, "invalid_request_error", Some("invalid_upload")),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request_error", None),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_request_error", Some("missing_images")),
            AppError::InvalidCredential(_) => (StatusCode::BAD_GATEWAY, "provider_error", Some("invalid_api_key")),
            AppError::Provider(_) => (StatusCode::BAD_GATEWAY, "provider_error", None),
            AppError::RequestInFlight => (StatusCode::CONFLICT, "conflict_error", Some("request_in_flight")),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found_error", None),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                message: self.to_string(),
                r#type: error_type.to_string(),
                code: code.map(|c| c.to_string()),
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
