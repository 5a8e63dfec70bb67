//! Try-on pipeline - request building, result extraction, and orchestration

pub mod extractor;
pub mod orchestrator;
pub mod request;

pub use extractor::{extract, ImageArtifact, TryOnOutcome, DOWNLOAD_FILE_NAME};
pub use orchestrator::{Orchestrator, TryOnState, TryOnStatus};
pub use request::{RequestPart, ResponseModality, TryOnRequest, TRY_ON_INSTRUCTION};
