//! Scripted [`MedicalApi`] used by the controller tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

use crate::{
    api::MedicalApi,
    error::{ApiError, Result},
    models::{
        ChatResponse, DoctorQuery, DoctorSearchResponse, ImageAnalysisResponse, ImageFile,
        ServiceStatus,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Chat(String),
    Image(String),
    Doctors(DoctorQuery),
}

/// Replies are popped in order; an empty queue answers with an empty success.
/// While held, every call parks until [`FakeApi::release`].
#[derive(Default)]
pub(crate) struct FakeApi {
    chat: Mutex<VecDeque<Result<ChatResponse>>>,
    image: Mutex<VecDeque<Result<ImageAnalysisResponse>>>,
    doctors: Mutex<VecDeque<Result<DoctorSearchResponse>>>,
    calls: Mutex<Vec<Call>>,
    held: AtomicBool,
    entered: Notify,
    released: Notify,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_chat(&self, reply: Result<ChatResponse>) {
        self.chat.lock().unwrap().push_back(reply);
    }

    pub fn reply_image(&self, reply: Result<ImageAnalysisResponse>) {
        self.image.lock().unwrap().push_back(reply);
    }

    pub fn reply_doctors(&self, reply: Result<DoctorSearchResponse>) {
        self.doctors.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    /// Waits until a held call has been made
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.held.store(false, Ordering::SeqCst);
        self.released.notify_one();
    }

    async fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        if self.held.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.released.notified().await;
        }
    }
}

pub(crate) fn unavailable() -> ApiError {
    ApiError::Status {
        status: 503,
        body: "Service Unavailable".to_string(),
    }
}

#[async_trait]
impl MedicalApi for FakeApi {
    async fn chat(&self, message: &str) -> Result<ChatResponse> {
        self.record(Call::Chat(message.to_string())).await;
        self.chat.lock().unwrap().pop_front().unwrap_or_else(|| Ok(ChatResponse::default()))
    }

    async fn classify_image(&self, file: &ImageFile) -> Result<ImageAnalysisResponse> {
        self.record(Call::Image(file.name.clone())).await;
        self.image
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ImageAnalysisResponse::default()))
    }

    async fn find_doctors(&self, query: &DoctorQuery) -> Result<DoctorSearchResponse> {
        self.record(Call::Doctors(query.clone())).await;
        self.doctors
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(DoctorSearchResponse::default()))
    }

    async fn ping(&self) -> Result<ServiceStatus> {
        Ok(ServiceStatus {
            message: Some("fake".to_string()),
        })
    }
}
