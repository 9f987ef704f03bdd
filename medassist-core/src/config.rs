//! Endpoint configuration for the remote medical assistant backend.
//!
//! The backend address is hardcoded to the local development server and can be
//! overridden with `MEDASSIST_API_URL` (or explicitly by the caller).

use serde::{Deserialize, Serialize};

/// Environment variable holding the backend base URL
pub const API_URL_ENV: &str = "MEDASSIST_API_URL";

/// Base URL used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Fully resolved URLs of every endpoint the client talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Symptom inference (`POST`, JSON body)
    pub chat_url: String,
    /// Skin image classification (`POST`, multipart body)
    pub image_url: String,
    /// Doctor lookup (`GET`, query parameters)
    pub doctors_url: String,
    /// Service banner used as a health check (`GET`)
    pub health_url: String,
}

impl ApiConfig {
    pub fn from_base_url(base_url: &str) -> Self {
        let base = base_url.trim().trim_end_matches('/');
        Self {
            chat_url: format!("{}/chat", base),
            image_url: format!("{}/image", base),
            doctors_url: format!("{}/find_doctors", base),
            health_url: format!("{}/", base),
        }
    }

    /// Resolve from `MEDASSIST_API_URL`, falling back to [`DEFAULT_API_URL`]
    pub fn from_env() -> Self {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::from_base_url(&url),
            _ => Self::default(),
        }
    }

    /// An explicit URL wins over the environment
    pub fn resolve(explicit: Option<&str>) -> Self {
        match explicit {
            Some(url) if !url.trim().is_empty() => Self::from_base_url(url),
            _ => Self::from_env(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_base_url(DEFAULT_API_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_backend() {
        let config = ApiConfig::default();
        assert_eq!(config.chat_url, "http://127.0.0.1:8000/chat");
        assert_eq!(config.image_url, "http://127.0.0.1:8000/image");
        assert_eq!(config.doctors_url, "http://127.0.0.1:8000/find_doctors");
        assert_eq!(config.health_url, "http://127.0.0.1:8000/");
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let config = ApiConfig::from_base_url("https://api.example.org/v1/");
        assert_eq!(config.chat_url, "https://api.example.org/v1/chat");
        assert_eq!(config.health_url, "https://api.example.org/v1/");
    }

    #[test]
    fn flag_then_environment_then_default() {
        // SAFETY: the only test in this crate that touches the variable
        unsafe { std::env::set_var(API_URL_ENV, "http://10.0.0.7:8000/") };
        let from_env = ApiConfig::resolve(None);
        let blank_flag = ApiConfig::resolve(Some("  "));
        let explicit = ApiConfig::resolve(Some("http://10.0.0.5:9000"));
        unsafe { std::env::remove_var(API_URL_ENV) };
        let fallback = ApiConfig::resolve(None);

        assert_eq!(from_env.chat_url, "http://10.0.0.7:8000/chat");
        assert_eq!(blank_flag, from_env);
        assert_eq!(explicit.doctors_url, "http://10.0.0.5:9000/find_doctors");
        assert_eq!(fallback, ApiConfig::default());
    }
}
