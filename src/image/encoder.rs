//! Base64 and data URI encoding for image files

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AppError, Result};
use crate::image::SourceFile;

/// Transport-safe payload of one image: base64 text without any URI prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImagePart {
    pub data: String,
    pub mime_type: String,
}

/// Encode binary data to base64 string
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode base64 string to binary data
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(strip_data_uri_prefix(encoded).unwrap_or(encoded).trim())
        .map_err(|e| AppError::InvalidRequest(format!("Invalid base64 data: {}", e)))
}

/// Create a data URI from binary data
pub fn data_uri(data: &[u8], media_type: &str) -> String {
    format!("data:{};base64,{}", media_type, encode(data))
}

/// Everything after the first `,` of a data URI, or `None` if there is no `,`.
pub fn strip_data_uri_prefix(data_uri: &str) -> Option<&str> {
    data_uri.split_once(',').map(|(_, payload)| payload)
}

/// Get the media type from a data URI (e.g. `image/png`)
pub fn media_type_from_data_uri(data_uri: &str) -> Option<&str> {
    let rest = data_uri.strip_prefix("data:")?;
    let end = rest.find(|c: char| c == ';' || c == ',')?;
    Some(&rest[..end])
}

/// Build the renderable preview of a file as a data URI.
pub async fn preview_data_uri(file: &SourceFile) -> String {
    let file = file.clone();
    match tokio::task::spawn_blocking(move || data_uri(file.bytes(), file.media_type())).await {
        Ok(uri) => uri,
        Err(e) => {
            warn!(error = %e, "Preview encoding task failed");
            String::new()
        }
    }
}

/// Encode a file into an inline image part.
///
/// Never fails: when the blocking encode task cannot complete, the part
/// carries an empty payload.
pub async fn encode_part(file: &SourceFile) -> EncodedImagePart {
    let owned = file.clone();
    let data = match tokio::task::spawn_blocking(move || encode(owned.bytes())).await {
        Ok(payload) => payload,
        Err(e) => {
            warn!(file = %file.name(), error = %e, "Encoding task failed, sending empty data");
            String::new()
        }
    };

    EncodedImagePart {
        data,
        mime_type: file.media_type().to_string(),
    }
}

/// Detect an image media type from binary data using magic bytes
pub fn detect_media_type(data: &[u8]) -> Option<&'static str> {
    if data.len() < 8 {
        return None;
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }

    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }

    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("image/gif");
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    if data.starts_with(b"BM") {
        return Some("image/bmp");
    }

    None
}
