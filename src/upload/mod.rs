//! Upload module - per-slot image selection with previews

pub mod collector;

use serde::Serialize;

use crate::image::SourceFile;

pub use collector::{UploadCollector, UploadMode};

/// A selected image together with its renderable preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub file: SourceFile,
    /// Data URI of the file, suitable for an `<img src>`.
    pub preview_url: String,
}

/// Serializable description of an [`UploadedImage`] for listings.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedImageInfo {
    pub index: usize,
    pub name: String,
    pub media_type: String,
    pub size: usize,
    pub preview_url: String,
}

impl UploadedImage {
    pub fn info(&self, index: usize) -> UploadedImageInfo {
        UploadedImageInfo {
            index,
            name: self.file.name().to_string(),
            media_type: self.file.media_type().to_string(),
            size: self.file.len(),
            preview_url: self.preview_url.clone(),
        }
    }
}
