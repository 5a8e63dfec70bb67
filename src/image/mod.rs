//! Image module - source files and their transport encodings

pub mod encoder;

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;

pub use encoder::EncodedImagePart;

/// A user-selected image file: raw bytes tagged with a media type.
///
/// Cloning is cheap; the bytes are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: String,
    media_type: String,
    bytes: Arc<[u8]>,
}

impl SourceFile {
    /// Create a source file with an explicit media type.
    ///
    /// An empty media type is filled from the file's magic bytes when they
    /// are recognised.
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        let mut media_type: String = media_type.into();
        if media_type.trim().is_empty() {
            media_type = encoder::detect_media_type(&bytes)
                .unwrap_or_default()
                .to_string();
        }

        Self {
            name: name.into(),
            media_type,
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, detecting its media type from content.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::new(name, String::new(), bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
