//! Upload collector for one image slot

use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::image::{encoder, SourceFile};
use crate::upload::UploadedImage;

/// How a new batch of files merges with the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    /// A new batch replaces the selection; at most one image is kept.
    Single,
    /// A new batch is appended to the selection.
    Multiple,
}

type Subscriber = Arc<dyn Fn(&[UploadedImage]) + Send + Sync>;

/// Ordered selection of images for one upload slot.
///
/// Every mutation hands the full resulting list to the subscriber before
/// returning. Mutations are serialized together with their notification, so
/// the subscriber sees the lists in the order the changes were applied.
pub struct UploadCollector {
    id: String,
    mode: UploadMode,
    mutation: Mutex<()>,
    images: RwLock<Vec<UploadedImage>>,
    subscriber: RwLock<Option<Subscriber>>,
    drag_active: AtomicBool,
}

impl UploadCollector {
    /// Create an empty collector
    pub fn new(id: impl Into<String>, mode: UploadMode) -> Self {
        Self {
            id: id.into(),
            mode,
            mutation: Mutex::new(()),
            images: RwLock::new(Vec::new()),
            subscriber: RwLock::new(None),
            drag_active: AtomicBool::new(false),
        }
    }

    /// Register the callback notified with the full list after each change.
    /// Replaces any previous subscriber.
    ///
    /// The callback may read the collector or re-subscribe, but must not
    /// mutate it.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&[UploadedImage]) + Send + Sync + 'static,
    {
        *self.subscriber.write() = Some(Arc::new(callback));
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> UploadMode {
        self.mode
    }

    /// Add a batch of files, returning the resulting selection.
    ///
    /// Previews for the batch are built concurrently. An empty batch changes
    /// nothing and notifies no one.
    pub async fn add_files(&self, files: Vec<SourceFile>) -> Vec<UploadedImage> {
        if files.is_empty() {
            return self.images();
        }

        let previews = join_all(files.iter().map(|file| encoder::preview_data_uri(file))).await;
        let new_images: Vec<UploadedImage> = files
            .into_iter()
            .zip(previews)
            .map(|(file, preview_url)| UploadedImage { file, preview_url })
            .collect();

        let mode = self.mode;
        let updated = self.apply(|images| match mode {
            UploadMode::Single => {
                *images = new_images.into_iter().take(1).collect();
            }
            UploadMode::Multiple => images.extend(new_images),
        });

        debug!(collector = %self.id, count = updated.len(), "Images added");
        updated
    }

    /// Remove the image at `index`, shifting later images down.
    ///
    /// An out-of-range index leaves the selection as it is; subscribers are
    /// still notified.
    pub fn remove(&self, index: usize) -> Vec<UploadedImage> {
        let updated = self.apply(|images| {
            if index < images.len() {
                images.remove(index);
            }
        });

        debug!(collector = %self.id, index, count = updated.len(), "Image removed");
        updated
    }

    /// Clear the selection
    pub fn reset(&self) {
        self.drag_active.store(false, Ordering::Relaxed);
        self.apply(|images| images.clear());
    }

    /// Snapshot of the current selection
    pub fn images(&self) -> Vec<UploadedImage> {
        self.images.read().clone()
    }

    pub fn first(&self) -> Option<UploadedImage> {
        self.images.read().first().cloned()
    }

    pub fn len(&self) -> usize {
        self.images.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.read().is_empty()
    }

    pub fn drag_enter(&self) {
        self.drag_active.store(true, Ordering::Relaxed);
    }

    pub fn drag_over(&self) {
        self.drag_active.store(true, Ordering::Relaxed);
    }

    pub fn drag_leave(&self) {
        self.drag_active.store(false, Ordering::Relaxed);
    }

    /// Files dropped onto the slot: ends the drag and adds the batch.
    pub async fn drop_files(&self, files: Vec<SourceFile>) -> Vec<UploadedImage> {
        self.drag_active.store(false, Ordering::Relaxed);
        self.add_files(files).await
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag_active.load(Ordering::Relaxed)
    }

    /// Apply one change and notify the subscriber before the next change may
    /// start.
    fn apply<F>(&self, change: F) -> Vec<UploadedImage>
    where
        F: FnOnce(&mut Vec<UploadedImage>),
    {
        let _serial = self.mutation.lock();
        let updated = {
            let mut images = self.images.write();
            change(&mut images);
            images.clone()
        };
        self.emit(&updated);
        updated
    }

    fn emit(&self, images: &[UploadedImage]) {
        let callback = self.subscriber.read().clone();
        if let Some(callback) = callback {
            callback(images);
        }
    }
}

impl std::fmt::Debug for UploadCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadCollector")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("images", &self.len())
            .field("drag_active", &self.is_drag_active())
            .finish()
    }
}
