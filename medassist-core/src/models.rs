use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Reply used when the inference service answers without any reply text
pub const DEFAULT_REPLY: &str =
    "I couldn't find an answer for that. Could you describe your symptoms in more detail?";

/// Assistant turn appended when the inference request fails
pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble reaching the medical assistant right now. Please try again in a moment.";

pub const UNKNOWN_DISEASE: &str = "Unknown";
pub const DEFAULT_ANALYSIS_DETAILS: &str = "Analysis complete";

/// Treats an explicit JSON `null` the same as a missing field.
fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A value of the wrong shape reads as absent instead of failing the response.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Ratings arrive as numbers or as numeric strings, depending on the upstream directory.
fn lenient_rating<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let rating = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(rating.filter(|r: &f64| r.is_finite()))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One ranked candidate returned by the symptom inference service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseasePrediction {
    #[serde(rename = "disease_en", default, deserialize_with = "null_to_default")]
    pub disease_label: String,
    #[serde(rename = "disease_translated", default)]
    pub translated_label: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub confidence: f64,
}

impl DiseasePrediction {
    /// Translated label only when it adds something over the English one
    pub fn distinct_translation(&self) -> Option<&str> {
        non_empty(self.translated_label.as_deref()).filter(|t| *t != self.disease_label)
    }
}

/// An entry of the chat transcript. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    /// Ranked candidates in the order the service returned them
    pub diseases: Option<Vec<DiseasePrediction>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content.into(), None)
    }

    pub fn assistant(content: impl Into<String>, diseases: Option<Vec<DiseasePrediction>>) -> Self {
        Self::new(MessageRole::Assistant, content.into(), diseases)
    }

    fn new(role: MessageRole, content: String, diseases: Option<Vec<DiseasePrediction>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            diseases,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Structured reply produced when the service ran a prediction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatDetail {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub disease: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub precautions: Vec<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Greetings and language switches come back as a bare string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatReply {
    Text(String),
    Detailed(ChatDetail),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub chat: Option<ChatReply>,
    #[serde(default)]
    pub top10: Option<Vec<DiseasePrediction>>,
}

impl ChatResponse {
    pub fn reply_text(&self) -> Option<&str> {
        let text = match self.chat.as_ref()? {
            ChatReply::Text(text) => Some(text.as_str()),
            ChatReply::Detailed(detail) => detail.response.as_deref(),
        };
        non_empty(text)
    }

    /// Converts into the assistant turn, substituting defaults for absent fields
    pub fn into_message(self) -> Message {
        let content = self.reply_text().unwrap_or(DEFAULT_REPLY).to_string();
        let diseases = self.top10.unwrap_or_default();
        Message::assistant(content, Some(diseases))
    }
}

// ---------------------------------------------------------------------------
// Image upload
// ---------------------------------------------------------------------------

/// A locally selected file together with its declared media type
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.media_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The current selection of the upload panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSelection {
    pub id: Uuid,
    pub file: Arc<ImageFile>,
    /// Base64 data URI, absent until local encoding finishes
    pub preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub disease_label: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageAnalysisResponse {
    #[serde(default)]
    pub detected_disease: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl ImageAnalysisResponse {
    pub fn into_result(self) -> AnalysisResult {
        AnalysisResult {
            disease_label: non_empty(self.detected_disease.as_deref())
                .unwrap_or(UNKNOWN_DISEASE)
                .to_string(),
            details: non_empty(self.details.as_deref())
                .unwrap_or(DEFAULT_ANALYSIS_DETAILS)
                .to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Doctor lookup
// ---------------------------------------------------------------------------

/// Lookup criteria; at least one field is always present
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorQuery {
    pub disease: Option<String>,
    pub symptom: Option<String>,
}

impl DoctorQuery {
    /// Trims both fields and drops empty ones. `None` when nothing is left.
    pub fn new(disease: &str, symptom: &str) -> Option<Self> {
        let disease = non_empty(Some(disease)).map(str::to_string);
        let symptom = non_empty(Some(symptom)).map(str::to_string);
        if disease.is_none() && symptom.is_none() {
            return None;
        }
        Some(Self { disease, symptom })
    }

    /// Query parameters, omitting absent fields entirely
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        let mut params = Vec::with_capacity(2);
        if let Some(disease) = &self.disease {
            params.push(("disease", disease.as_str()));
        }
        if let Some(symptom) = &self.symptom {
            params.push(("symptom", symptom.as_str()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostalAddress {
    #[serde(default, deserialize_with = "null_to_default")]
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub country: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Address {
    Postal(PostalAddress),
    Freeform(String),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Freeform(text) => write!(f, "{}", text.trim()),
            Address::Postal(postal) => {
                let city_line = [postal.city.as_str(), postal.state.as_str(), postal.zip.as_str()]
                    .into_iter()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                let parts = [
                    Some(postal.line1.as_str()),
                    postal.line2.as_deref(),
                    Some(city_line.as_str()),
                    Some(postal.country.as_str()),
                ];
                let joined = parts
                    .into_iter()
                    .flatten()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}", joined)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(default, deserialize_with = "null_to_default")]
    pub name: String,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub hospital: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(
        rename = "contactNumber",
        alias = "contact",
        alias = "contact_number",
        alias = "phone",
        default,
        deserialize_with = "null_to_default"
    )]
    pub contact_number: String,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorSearchResponse {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Banner returned by the service root
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub message: Option<String>,
}
