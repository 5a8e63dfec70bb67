//! One try-on session: the person and outfit slots wired to the orchestrator

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::provider::GenerationProvider;
use crate::tryon::{ImageArtifact, Orchestrator, TryOnState};
use crate::upload::{UploadCollector, UploadMode, UploadedImage, UploadedImageInfo};

pub const PERSON_UPLOADER_ID: &str = "person-uploader";
pub const OUTFIT_UPLOADER_ID: &str = "outfit-uploader";

/// What the collectors last reported
#[derive(Debug, Default)]
struct Selection {
    person: Option<UploadedImage>,
    outfits: Vec<UploadedImage>,
}

/// Serializable view of the whole session
#[derive(Debug, Clone, Serialize)]
pub struct StudioSnapshot {
    pub person: Vec<UploadedImageInfo>,
    pub outfits: Vec<UploadedImageInfo>,
    /// Whether the try-on action is currently available
    pub can_try_on: bool,
    pub state: TryOnState,
}

pub struct Studio {
    person: UploadCollector,
    outfits: UploadCollector,
    selection: Arc<RwLock<Selection>>,
    orchestrator: Orchestrator,
}

impl Studio {
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        let selection = Arc::new(RwLock::new(Selection::default()));

        let person = UploadCollector::new(PERSON_UPLOADER_ID, UploadMode::Single);
        let mirror = selection.clone();
        person.subscribe(move |images| {
            mirror.write().person = images.first().cloned();
        });

        let outfits = UploadCollector::new(OUTFIT_UPLOADER_ID, UploadMode::Multiple);
        let mirror = selection.clone();
        outfits.subscribe(move |images| {
            mirror.write().outfits = images.to_vec();
        });

        Self {
            person,
            outfits,
            selection,
            orchestrator: Orchestrator::new(provider),
        }
    }

    pub fn person(&self) -> &UploadCollector {
        &self.person
    }

    pub fn outfits(&self) -> &UploadCollector {
        &self.outfits
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Run a try-on with whatever is currently selected
    pub async fn try_on(&self) -> Result<TryOnState> {
        let (person, outfits) = {
            let selection = self.selection.read();
            (selection.person.clone(), selection.outfits.clone())
        };
        self.orchestrator.trigger(person.as_ref(), &outfits).await
    }

    pub fn result(&self) -> Option<ImageArtifact> {
        self.orchestrator.result()
    }

    pub fn can_try_on(&self) -> bool {
        let selection = self.selection.read();
        selection.person.is_some() && !selection.outfits.is_empty() && !self.orchestrator.is_loading()
    }

    /// Clear both slots and the last outcome
    pub fn reset(&self) {
        self.person.reset();
        self.outfits.reset();
        self.orchestrator.reset();
    }

    pub fn snapshot(&self) -> StudioSnapshot {
        let (person, outfits) = {
            let selection = self.selection.read();
            (
                selection.person.iter().map(|image| image.info(0)).collect(),
                selection
                    .outfits
                    .iter()
                    .enumerate()
                    .map(|(index, image)| image.info(index))
                    .collect(),
            )
        };

        StudioSnapshot {
            person,
            outfits,
            can_try_on: self.can_try_on(),
            state: self.orchestrator.state(),
        }
    }
}
