//! Result extraction from provider responses

use serde::Serialize;

use crate::error::Result;
use crate::image::encoder;
use crate::provider::ProviderResponse;

/// File name offered when the result is downloaded
pub const DOWNLOAD_FILE_NAME: &str = "virtual-try-on.png";

/// A generated image ready to display or download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageArtifact {
    pub mime_type: String,
    /// Base64 payload without prefix
    #[serde(skip)]
    pub data: String,
}

impl ImageArtifact {
    /// `data:<mime>;base64,<payload>`
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        encoder::decode(&self.data)
    }

    pub fn file_name(&self) -> &'static str {
        DOWNLOAD_FILE_NAME
    }
}

/// Outcome of a provider call that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TryOnOutcome {
    Image(ImageArtifact),
    NoImageFound,
}

/// Pick the first inline image of the first candidate.
///
/// Later image parts and other candidates are ignored.
pub fn extract(response: &ProviderResponse) -> TryOnOutcome {
    let parts = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| content.parts.as_slice())
        .unwrap_or_default();

    parts
        .iter()
        .filter_map(|part| part.inline_data.as_ref())
        .find(|inline| !inline.data.is_empty())
        .map(|inline| {
            TryOnOutcome::Image(ImageArtifact {
                mime_type: inline.mime_type.clone(),
                data: inline.data.clone(),
            })
        })
        .unwrap_or(TryOnOutcome::NoImageFound)
}
