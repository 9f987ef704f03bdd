use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    api::MedicalApi,
    controller::{ActionOutcome, Generation, InFlight, Rejection, lock},
    models::{Doctor, DoctorQuery},
    notify::{Notification, Notifier},
};

/// Which half of the lookup dialog is showing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoctorView {
    #[default]
    Form,
    Results,
}

#[derive(Debug, Default)]
struct LookupState {
    disease_text: String,
    symptom_text: String,
    doctors: Vec<Doctor>,
    view: DoctorView,
}

struct Inner {
    api: Arc<dyn MedicalApi>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<LookupState>,
    in_flight: InFlight,
    generation: Generation,
}

/// "Find a doctor" dialog state.
#[derive(Clone)]
pub struct DoctorLookupController {
    inner: Arc<Inner>,
}

impl DoctorLookupController {
    pub fn new(api: Arc<dyn MedicalApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                notifier,
                state: Mutex::new(LookupState::default()),
                in_flight: InFlight::new(),
                generation: Generation::default(),
            }),
        }
    }

    /// Looks up doctors by disease and/or symptom; at least one must be non-blank.
    pub async fn search(&self, disease_text: &str, symptom_text: &str) -> ActionOutcome {
        let Some(query) = DoctorQuery::new(disease_text, symptom_text) else {
            debug!("Doctor search without disease or symptom");
            self.inner.notifier.notify(
                Notification::error("Missing information")
                    .with_description("Please enter a disease or a symptom to search for."),
            );
            return ActionOutcome::Rejected(Rejection::EmptyInput);
        };

        let Some(_guard) = self.inner.in_flight.try_begin() else {
            warn!("Doctor lookup already in flight, rejecting");
            return ActionOutcome::Rejected(Rejection::Busy);
        };

        {
            let mut state = lock(&self.inner.state);
            state.disease_text = disease_text.to_string();
            state.symptom_text = symptom_text.to_string();
        }
        let issued_at = self.inner.generation.current();

        match self.inner.api.find_doctors(&query).await {
            Ok(found) => {
                let doctors = found.doctors;
                if self.inner.generation.current() != issued_at {
                    warn!("Applying doctor results to a dialog that was closed meanwhile");
                }
                info!(count = doctors.len(), "Doctor lookup complete");
                self.inner
                    .notifier
                    .notify(Notification::success(found_title(doctors.len())));

                let mut state = lock(&self.inner.state);
                state.doctors = doctors;
                state.view = DoctorView::Results;
                ActionOutcome::Applied
            }
            Err(e) => {
                error!(error = %e, "Doctor lookup failed");
                self.inner.notifier.notify(
                    Notification::error("Search failed")
                        .with_description("Could not fetch doctors. Please try again."),
                );
                ActionOutcome::Failed
            }
        }
    }

    /// Back to the form, keeping what was typed
    pub fn new_search(&self) {
        let mut state = lock(&self.inner.state);
        state.doctors.clear();
        state.view = DoctorView::Form;
    }

    /// Dialog dismissed: forget everything
    pub fn close(&self) {
        *lock(&self.inner.state) = LookupState::default();
        self.inner.generation.bump();
        debug!("Doctor lookup closed");
    }

    pub fn view(&self) -> DoctorView {
        lock(&self.inner.state).view
    }

    pub fn doctors(&self) -> Vec<Doctor> {
        lock(&self.inner.state).doctors.clone()
    }

    /// Current `(disease, symptom)` field text
    pub fn fields(&self) -> (String, String) {
        let state = lock(&self.inner.state);
        (state.disease_text.clone(), state.symptom_text.clone())
    }

    pub fn is_busy(&self) -> bool {
        self.inner.in_flight.is_busy()
    }
}

fn found_title(count: usize) -> String {
    match count {
        1 => "Found 1 doctor".to_string(),
        n => format!("Found {} doctors", n),
    }
}
