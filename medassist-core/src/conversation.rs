use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    api::MedicalApi,
    controller::{ActionOutcome, InFlight, Rejection, lock},
    models::{FALLBACK_REPLY, Message},
    notify::{Notification, Notifier},
};

/// Chat transcript plus the one inference request it may have in flight.
///
/// Cloning gives another handle to the same conversation.
#[derive(Clone)]
pub struct ConversationController {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn MedicalApi>,
    notifier: Arc<dyn Notifier>,
    transcript: Mutex<Vec<Message>>,
    in_flight: InFlight,
}

impl ConversationController {
    pub fn new(api: Arc<dyn MedicalApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                notifier,
                transcript: Mutex::new(Vec::new()),
                in_flight: InFlight::new(),
            }),
        }
    }

    /// Sends `text` to the symptom checker.
    ///
    /// The user turn is appended before the request goes out; the assistant turn
    /// (or the fallback turn on failure) once it resolves. Nothing is ever removed.
    pub async fn submit(&self, text: &str) -> ActionOutcome {
        if text.trim().is_empty() {
            debug!("Ignoring empty chat input");
            return ActionOutcome::Rejected(Rejection::EmptyInput);
        }

        let Some(_guard) = self.inner.in_flight.try_begin() else {
            warn!("Chat request already in flight, rejecting new message");
            return ActionOutcome::Rejected(Rejection::Busy);
        };

        self.append(Message::user(text));

        match self.inner.api.chat(text).await {
            Ok(response) => {
                let reply = response.into_message();
                info!(
                    diseases = reply.diseases.as_ref().map_or(0, Vec::len),
                    "Assistant reply received"
                );
                self.append(reply);
                ActionOutcome::Applied
            }
            Err(e) => {
                error!(error = %e, "Symptom inference failed");
                self.append(Message::assistant(FALLBACK_REPLY, None));
                self.inner.notifier.notify(
                    Notification::error("Connection error")
                        .with_description("Could not reach the medical assistant. Please try again."),
                );
                ActionOutcome::Failed
            }
        }
    }

    pub fn transcript(&self) -> Vec<Message> {
        lock(&self.inner.transcript).clone()
    }

    pub fn last_message(&self) -> Option<Message> {
        lock(&self.inner.transcript).last().cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.inner.transcript).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_busy(&self) -> bool {
        self.inner.in_flight.is_busy()
    }

    fn append(&self, message: Message) {
        lock(&self.inner.transcript).push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatResponse, DEFAULT_REPLY, MessageRole};
    use crate::notify::{NotificationKind, NotificationLog};
    use crate::testing::{Call, FakeApi, unavailable};
    use serde_json::json;

    fn controller() -> (ConversationController, Arc<FakeApi>, Arc<NotificationLog>) {
        let api = Arc::new(FakeApi::new());
        let log = Arc::new(NotificationLog::new());
        (
            ConversationController::new(api.clone(), log.clone()),
            api,
            log,
        )
    }

    fn ranked_reply() -> ChatResponse {
        serde_json::from_value(json!({
            "chat": { "response": "Expected Disease: Diabetes (Confidence: 0.42)" },
            "top10": [
                {"disease_en": "Diabetes", "disease_translated": "Diabète", "confidence": 0.42},
                {"disease_en": "Malaria", "disease_translated": "Paludisme", "confidence": 0.31},
                {"disease_en": "Migraine", "disease_translated": "Migraine", "confidence": 0.10}
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn successful_reply_appends_user_then_assistant() {
        let (chat, api, log) = controller();
        api.reply_chat(Ok(ranked_reply()));

        let outcome = chat.submit("I feel thirsty all the time").await;

        assert_eq!(outcome, ActionOutcome::Applied);
        let transcript = chat.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, MessageRole::User);
        assert_eq!(transcript[0].content, "I feel thirsty all the time");
        assert!(transcript[0].diseases.is_none());
        assert_eq!(transcript[1].role, MessageRole::Assistant);
        assert_eq!(
            transcript[1].content,
            "Expected Disease: Diabetes (Confidence: 0.42)"
        );

        let labels: Vec<_> = transcript[1]
            .diseases
            .as_ref()
            .unwrap()
            .iter()
            .map(|d| d.disease_label.as_str())
            .collect();
        assert_eq!(labels, vec!["Diabetes", "Malaria", "Migraine"]);
        assert!(log.is_empty());
        assert_eq!(
            api.calls(),
            vec![Call::Chat("I feel thirsty all the time".to_string())]
        );
    }

    #[tokio::test]
    async fn blank_input_is_a_no_op() {
        let (chat, api, log) = controller();

        for input in ["", "   ", "\n\t"] {
            let outcome = chat.submit(input).await;
            assert_eq!(outcome, ActionOutcome::Rejected(Rejection::EmptyInput));
        }

        assert!(chat.is_empty());
        assert!(api.calls().is_empty());
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn failure_appends_fallback_and_notifies() {
        let (chat, api, log) = controller();
        api.reply_chat(Err(unavailable()));

        let outcome = chat.submit("headache").await;

        assert_eq!(outcome, ActionOutcome::Failed);
        let transcript = chat.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].content, "headache");
        assert_eq!(transcript[1].content, FALLBACK_REPLY);
        assert!(transcript[1].diseases.is_none());

        let notifications = log.entries();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Error);
        assert!(!chat.is_busy());
    }

    #[tokio::test]
    async fn missing_fields_use_default_reply() {
        let (chat, api, _log) = controller();
        api.reply_chat(Ok(ChatResponse::default()));

        chat.submit("cough").await;

        let reply = chat.last_message().unwrap();
        assert_eq!(reply.content, DEFAULT_REPLY);
        assert_eq!(reply.diseases, Some(Vec::new()));
    }

    #[tokio::test]
    async fn user_turn_is_visible_before_reply_and_second_submit_is_rejected() {
        let (chat, api, _log) = controller();
        api.hold();
        api.reply_chat(Ok(ranked_reply()));

        let pending = tokio::spawn({
            let chat = chat.clone();
            async move { chat.submit("fever and chills").await }
        });
        api.entered().await;

        assert!(chat.is_busy());
        assert_eq!(chat.len(), 1);
        assert_eq!(chat.transcript()[0].role, MessageRole::User);

        let second = chat.submit("also a rash").await;
        assert_eq!(second, ActionOutcome::Rejected(Rejection::Busy));
        assert_eq!(chat.len(), 1);

        api.release();
        assert_eq!(pending.await.unwrap(), ActionOutcome::Applied);
        assert_eq!(chat.len(), 2);
        assert_eq!(api.calls().len(), 1);
        assert!(!chat.is_busy());
    }
}
