use medassist_core::{
    ActionOutcome, ConversationController, DoctorLookupController, Notification,
    NotificationKind, Notifier, Rejection, UploadController, render,
};

/// Prints notifications to stderr, one line each
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("{}", notification_line(&notification));
    }
}

pub fn notification_line(notification: &Notification) -> String {
    let tag = match notification.kind {
        NotificationKind::Info => "info",
        NotificationKind::Success => "ok",
        NotificationKind::Error => "error",
    };
    match &notification.description {
        Some(description) => format!("[{}] {}: {}", tag, notification.title, description),
        None => format!("[{}] {}", tag, notification.title),
    }
}

pub fn rejection_line(rejection: &Rejection) -> &'static str {
    match rejection {
        Rejection::EmptyInput => "Nothing to send.",
        Rejection::Busy => "Still waiting for the previous request, try again when it finishes.",
        Rejection::NoFileSelected => "Select an image first (:image PATH).",
        Rejection::UnsupportedMediaType(_) => "That file is not an image.",
    }
}

/// Last exchange of the conversation, after a submit resolved
pub fn print_chat_outcome(conversation: &ConversationController, outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::Rejected(rejection) => println!("{}", rejection_line(rejection)),
        ActionOutcome::Applied | ActionOutcome::Failed => {
            if let Some(reply) = conversation.last_message() {
                println!("{}", render::message(&reply));
            }
        }
    }
}

pub fn print_transcript(conversation: &ConversationController) {
    let transcript = conversation.transcript();
    if transcript.is_empty() {
        println!("(no messages yet)");
    }
    for message in &transcript {
        println!("{}", render::message(message));
    }
}

pub fn print_analysis_outcome(upload: &UploadController, outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::Rejected(rejection) => println!("{}", rejection_line(rejection)),
        ActionOutcome::Failed => {}
        ActionOutcome::Applied => {
            if let Some(result) = upload.result() {
                println!("{}", render::analysis(&result));
            }
        }
    }
}

pub fn print_doctors_outcome(doctors: &DoctorLookupController, outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::Rejected(Rejection::EmptyInput) | ActionOutcome::Failed => {}
        ActionOutcome::Rejected(rejection) => println!("{}", rejection_line(rejection)),
        ActionOutcome::Applied => {
            let found = doctors.doctors();
            if found.is_empty() {
                println!("No doctors matched.");
            }
            for (i, doctor) in found.iter().enumerate() {
                println!("{:>2}. {}", i + 1, render::doctor(doctor));
            }
        }
    }
}
