//! Request handlers for the studio API

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::image::SourceFile;
use crate::studio::StudioSnapshot;
use crate::tryon::TryOnState;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub mime_type: String,
    pub data_uri: String,
    pub file_name: String,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_studio(State(state): State<Arc<AppState>>) -> Json<StudioSnapshot> {
    Json(state.studio.snapshot())
}

pub async fn reset_studio(State(state): State<Arc<AppState>>) -> Json<StudioSnapshot> {
    state.studio.reset();
    Json(state.studio.snapshot())
}

pub async fn upload_person(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<StudioSnapshot>> {
    let files = read_files(multipart).await?;
    state.studio.person().add_files(files).await;
    Ok(Json(state.studio.snapshot()))
}

pub async fn remove_person(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Json<StudioSnapshot> {
    state.studio.person().remove(index);
    Json(state.studio.snapshot())
}

pub async fn upload_outfits(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<StudioSnapshot>> {
    let files = read_files(multipart).await?;
    state.studio.outfits().add_files(files).await;
    Ok(Json(state.studio.snapshot()))
}

pub async fn remove_outfit(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Json<StudioSnapshot> {
    state.studio.outfits().remove(index);
    Json(state.studio.snapshot())
}

/// Runs on its own task so a dropped connection does not cut the request short.
pub async fn try_on(State(state): State<Arc<AppState>>) -> Result<Json<TryOnState>> {
    let studio = state.studio.clone();
    let outcome = tokio::spawn(async move { studio.try_on().await })
        .await
        .map_err(|e| AppError::Internal(format!("Try-on task failed: {}", e)))??;
    Ok(Json(outcome))
}

pub async fn get_result(State(state): State<Arc<AppState>>) -> Result<Json<ResultResponse>> {
    let artifact = state
        .studio
        .result()
        .ok_or_else(|| AppError::NotFound("No try-on result available".to_string()))?;

    Ok(Json(ResultResponse {
        data_uri: artifact.data_uri(),
        file_name: artifact.file_name().to_string(),
        mime_type: artifact.mime_type,
    }))
}

pub async fn download_result(State(state): State<Arc<AppState>>) -> Result<Response> {
    let artifact = state
        .studio
        .result()
        .ok_or_else(|| AppError::NotFound("No try-on result available".to_string()))?;
    let bytes = artifact.decode_bytes()?;

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, artifact.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Collect every file field of a multipart upload, in order
async fn read_files(mut multipart: Multipart) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let media_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        debug!(file = %name, media_type = %media_type, size = bytes.len(), "Received upload");
        files.push(SourceFile::new(name, media_type, bytes.to_vec()));
    }

    Ok(files)
}
