pub mod api;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod doctors;
pub mod error;
pub mod models;
pub mod notify;
pub mod render;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

// Re-export commonly used types
pub use api::{HttpMedicalApi, MedicalApi};
pub use config::ApiConfig;
pub use controller::{ActionOutcome, Rejection};
pub use conversation::ConversationController;
pub use doctors::{DoctorLookupController, DoctorView};
pub use error::{ApiError, Result};
pub use models::{
    AnalysisResult, Address, DiseasePrediction, Doctor, DoctorQuery, ImageFile, ImageSelection,
    Message, MessageRole, PostalAddress,
};
pub use notify::{Notification, NotificationKind, NotificationLog, Notifier, TracingNotifier};
pub use upload::UploadController;

/// The three panels of the assistant, wired to one backend and one notifier.
///
/// The controllers share nothing but those two handles; each keeps its own
/// state and its own in-flight flag.
#[derive(Clone)]
pub struct MedicalAssistant {
    pub conversation: ConversationController,
    pub upload: UploadController,
    pub doctors: DoctorLookupController,
}

impl MedicalAssistant {
    pub fn new(api: Arc<dyn MedicalApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            conversation: ConversationController::new(api.clone(), notifier.clone()),
            upload: UploadController::new(api.clone(), notifier.clone()),
            doctors: DoctorLookupController::new(api, notifier),
        }
    }

    /// Connects to the backend described by `config` over HTTP
    pub fn connect(config: ApiConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(Arc::new(HttpMedicalApi::new(config)), notifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;

    #[tokio::test]
    async fn busy_conversation_does_not_block_other_panels() {
        let api = Arc::new(FakeApi::new());
        let log = Arc::new(NotificationLog::new());
        let assistant = MedicalAssistant::new(api.clone(), log.clone());

        api.hold();
        let pending = tokio::spawn({
            let conversation = assistant.conversation.clone();
            async move { conversation.submit("sore throat").await }
        });
        api.entered().await;
        assert!(assistant.conversation.is_busy());
        api.release();

        assert!(!assistant.doctors.is_busy());
        assert!(!assistant.upload.is_busy());
        assert_eq!(
            assistant.doctors.search("", "sore throat").await,
            ActionOutcome::Applied
        );
        assert_eq!(pending.await.unwrap(), ActionOutcome::Applied);
        assert_eq!(assistant.conversation.len(), 2);
    }
}
