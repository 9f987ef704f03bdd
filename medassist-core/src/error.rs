use thiserror::Error;

/// Failures surfaced by the HTTP client adapter
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Service reported an error: {0}")]
    Service(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
