use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    api::MedicalApi,
    controller::{ActionOutcome, Generation, InFlight, Rejection, lock},
    models::{AnalysisResult, ImageFile, ImageSelection},
    notify::{Notification, Notifier},
};

#[derive(Debug, Default)]
struct UploadState {
    selection: Option<ImageSelection>,
    result: Option<AnalysisResult>,
}

struct Inner {
    api: Arc<dyn MedicalApi>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<UploadState>,
    in_flight: InFlight,
    generation: Generation,
    /// Ticks whenever the selection or its preview changes
    changed: watch::Sender<u64>,
}

impl Inner {
    fn touch(&self) {
        self.changed.send_modify(|tick| *tick = tick.wrapping_add(1));
    }

    fn store_preview(&self, selection_id: Uuid, data_uri: String) {
        {
            let mut state = lock(&self.state);
            match state.selection.as_mut() {
                Some(selection) if selection.id == selection_id => {
                    selection.preview = Some(data_uri);
                }
                _ => {
                    debug!(%selection_id, "Selection replaced before its preview was ready");
                    return;
                }
            }
        }
        self.touch();
    }
}

/// Image upload panel: selection, local preview and the classification result.
#[derive(Clone)]
pub struct UploadController {
    inner: Arc<Inner>,
}

impl UploadController {
    pub fn new(api: Arc<dyn MedicalApi>, notifier: Arc<dyn Notifier>) -> Self {
        let (changed, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                api,
                notifier,
                state: Mutex::new(UploadState::default()),
                in_flight: InFlight::new(),
                generation: Generation::default(),
                changed,
            }),
        }
    }

    /// Replaces the current selection with `file` and drops any previous result.
    ///
    /// The preview is encoded off the calling task, so it may be absent right
    /// after this returns; see [`UploadController::wait_for_preview`].
    pub fn select_file(&self, file: ImageFile) -> ActionOutcome {
        if !file.is_image() {
            warn!(file = %file.name, media_type = %file.media_type, "Rejected non-image file");
            self.inner.notifier.notify(
                Notification::error("Invalid file type")
                    .with_description("Please select an image file (JPG, PNG, ...)."),
            );
            return ActionOutcome::Rejected(Rejection::UnsupportedMediaType(file.media_type));
        }

        let file = Arc::new(file);
        let selection_id = Uuid::new_v4();
        {
            let mut state = lock(&self.inner.state);
            state.selection = Some(ImageSelection {
                id: selection_id,
                file: file.clone(),
                preview: None,
            });
            state.result = None;
        }
        self.inner.generation.bump();
        self.inner.touch();
        info!(file = %file.name, bytes = file.bytes.len(), "Image selected");

        let inner = self.inner.clone();
        let encode = move || {
            let data_uri = file.to_data_uri();
            inner.store_preview(selection_id, data_uri);
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(encode);
            }
            Err(_) => encode(),
        }

        ActionOutcome::Applied
    }

    /// Uploads the selected image for classification.
    pub async fn analyze(&self) -> ActionOutcome {
        let Some(file) = self.selected_file() else {
            debug!("Nothing selected, skipping analysis");
            return ActionOutcome::Rejected(Rejection::NoFileSelected);
        };

        let Some(_guard) = self.inner.in_flight.try_begin() else {
            warn!("Image analysis already in flight, rejecting");
            return ActionOutcome::Rejected(Rejection::Busy);
        };

        let issued_at = self.inner.generation.current();

        match self.inner.api.classify_image(&file).await {
            Ok(response) => {
                let result = response.into_result();
                if self.inner.generation.current() != issued_at {
                    warn!(file = %file.name, "Applying analysis for an image that is no longer selected");
                }
                info!(disease = %result.disease_label, "Image analysis complete");
                self.inner.notifier.notify(
                    Notification::success("Analysis complete")
                        .with_description(format!("Detected: {}", result.disease_label)),
                );
                lock(&self.inner.state).result = Some(result);
                self.inner.touch();
                ActionOutcome::Applied
            }
            Err(e) => {
                error!(file = %file.name, error = %e, "Image analysis failed");
                self.inner.notifier.notify(
                    Notification::error("Analysis failed")
                        .with_description("Could not analyze the image. Please try again."),
                );
                ActionOutcome::Failed
            }
        }
    }

    /// Clears selection, preview and result.
    pub fn reset(&self) {
        {
            let mut state = lock(&self.inner.state);
            state.selection = None;
            state.result = None;
        }
        self.inner.generation.bump();
        self.inner.touch();
        debug!("Upload panel reset");
    }

    pub fn selection(&self) -> Option<ImageSelection> {
        lock(&self.inner.state).selection.clone()
    }

    pub fn preview(&self) -> Option<String> {
        lock(&self.inner.state)
            .selection
            .as_ref()
            .and_then(|s| s.preview.clone())
    }

    pub fn result(&self) -> Option<AnalysisResult> {
        lock(&self.inner.state).result.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.in_flight.is_busy()
    }

    /// Resolves with the preview of the current selection once it is encoded,
    /// or `None` as soon as nothing is selected.
    pub async fn wait_for_preview(&self) -> Option<String> {
        let mut changes = self.inner.changed.subscribe();
        loop {
            {
                let state = lock(&self.inner.state);
                match &state.selection {
                    None => return None,
                    Some(selection) if selection.preview.is_some() => {
                        return selection.preview.clone();
                    }
                    Some(_) => {}
                }
            }
            if changes.changed().await.is_err() {
                return None;
            }
        }
    }

    fn selected_file(&self) -> Option<Arc<ImageFile>> {
        lock(&self.inner.state)
            .selection
            .as_ref()
            .map(|s| s.file.clone())
    }
}
