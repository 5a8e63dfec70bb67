//! Try-on orchestration: one in-flight request and its transient state

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::image::SourceFile;
use crate::provider::GenerationProvider;
use crate::tryon::extractor::{self, ImageArtifact, TryOnOutcome};
use crate::tryon::request::TryOnRequest;
use crate::upload::UploadedImage;

pub const MISSING_IMAGES_MESSAGE: &str = "Please upload your photo and at least one outfit image.";
pub const NO_IMAGE_MESSAGE: &str =
    "Could not generate an image. The model may not have returned an image result.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";
pub const CANCELLED_MESSAGE: &str = "The try-on request was cancelled before it completed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TryOnStatus {
    Idle,
    Loading,
    Success,
    Failed,
}

/// Snapshot of the orchestrator's state
#[derive(Debug, Clone, Serialize)]
pub struct TryOnState {
    pub status: TryOnStatus,
    pub result: Option<ImageArtifact>,
    pub error: Option<String>,
    pub request_id: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Default for TryOnState {
    fn default() -> Self {
        Self {
            status: TryOnStatus::Idle,
            result: None,
            error: None,
            request_id: None,
            completed_at: None,
        }
    }
}

impl TryOnState {
    fn loading(request_id: Uuid) -> Self {
        Self {
            status: TryOnStatus::Loading,
            request_id: Some(request_id),
            ..Self::default()
        }
    }

    fn success(request_id: Option<Uuid>, artifact: ImageArtifact) -> Self {
        Self {
            status: TryOnStatus::Success,
            result: Some(artifact),
            error: None,
            request_id,
            completed_at: Some(Utc::now()),
        }
    }

    fn failed(request_id: Option<Uuid>, message: impl Into<String>) -> Self {
        Self {
            status: TryOnStatus::Failed,
            result: None,
            error: Some(message.into()),
            request_id,
            completed_at: Some(Utc::now()),
        }
    }
}

/// Runs try-on requests against a provider, one at a time.
pub struct Orchestrator {
    provider: Arc<dyn GenerationProvider>,
    state: RwLock<TryOnState>,
    in_flight: AtomicBool,
}

/// Releases the in-flight flag; a request dropped mid-flight ends as failed.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
    state: &'a RwLock<TryOnState>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.state.write();
            if state.status == TryOnStatus::Loading {
                let request_id = state.request_id;
                warn!(request_id = ?request_id, "Try-on dropped while loading");
                *state = TryOnState::failed(request_id, CANCELLED_MESSAGE);
            }
        }
        self.flag.store(false, Ordering::Release);
    }
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            provider,
            state: RwLock::new(TryOnState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> TryOnState {
        self.state.read().clone()
    }

    pub fn status(&self) -> TryOnStatus {
        self.state.read().status
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn result(&self) -> Option<ImageArtifact> {
        self.state.read().result.clone()
    }

    /// Back to `Idle`, dropping any result or error. Ignored while loading.
    pub fn reset(&self) {
        if !self.is_loading() {
            *self.state.write() = TryOnState::default();
        }
    }

    /// Run one try-on with the current selections.
    ///
    /// Returns the final state. Every failure of the request itself ends in
    /// `Failed`; the only error returned is [`AppError::RequestInFlight`] when
    /// another trigger has not finished yet, in which case state is untouched.
    pub async fn trigger(
        &self,
        person: Option<&UploadedImage>,
        outfits: &[UploadedImage],
    ) -> Result<TryOnState> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Try-on triggered while another request is in flight");
            return Err(AppError::RequestInFlight);
        }
        let _guard = InFlightGuard {
            flag: &self.in_flight,
            state: &self.state,
        };

        let person = match person {
            Some(person) if !outfits.is_empty() => person,
            _ => {
                info!(
                    has_person = person.is_some(),
                    outfits = outfits.len(),
                    "Try-on rejected: missing images"
                );
                let state = TryOnState::failed(None, MISSING_IMAGES_MESSAGE);
                *self.state.write() = state.clone();
                return Ok(state);
            }
        };

        let request_id = Uuid::new_v4();
        *self.state.write() = TryOnState::loading(request_id);

        let outfit_files: Vec<SourceFile> = outfits.iter().map(|image| image.file.clone()).collect();
        let span = info_span!(
            "try_on",
            request_id = %request_id,
            provider = %self.provider.name(),
            model = %self.provider.model()
        );

        let state = async {
            info!(outfits = outfit_files.len(), "Starting try-on");
            match self.run(&person.file, &outfit_files).await {
                Ok(TryOnOutcome::Image(artifact)) => {
                    info!(mime_type = %artifact.mime_type, "Try-on succeeded");
                    TryOnState::success(Some(request_id), artifact)
                }
                Ok(TryOnOutcome::NoImageFound) => {
                    warn!("Provider returned no image");
                    TryOnState::failed(Some(request_id), NO_IMAGE_MESSAGE)
                }
                Err(e) => {
                    error!(error = %e, "Try-on failed");
                    TryOnState::failed(Some(request_id), failure_message(&e))
                }
            }
        }
        .instrument(span)
        .await;

        *self.state.write() = state.clone();
        Ok(state)
    }

    async fn run(&self, person: &SourceFile, outfits: &[SourceFile]) -> Result<TryOnOutcome> {
        let request = TryOnRequest::build(person, outfits).await?;
        let response = self.provider.generate(&request).await?;
        Ok(extractor::extract(&response))
    }
}

/// User-facing text for a fault: its own message, or a generic fallback.
pub fn failure_message(err: &AppError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        UNKNOWN_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}
