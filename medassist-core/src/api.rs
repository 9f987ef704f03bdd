//! HTTP client adapter for the three remote services.
//!
//! [`MedicalApi`] is the seam the controllers depend on; [`HttpMedicalApi`] is the
//! reqwest implementation. No timeouts or retries are configured: a failure is
//! whatever the transport reports, and it is reported once.

use async_trait::async_trait;
use reqwest::{Client, Response, multipart};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::{
    config::ApiConfig,
    error::{ApiError, Result},
    models::{
        ChatRequest, ChatResponse, DoctorQuery, DoctorSearchResponse, ImageAnalysisResponse,
        ImageFile, ServiceStatus,
    },
};

/// Multipart field name the classification endpoint reads the image from
pub const IMAGE_FIELD: &str = "file";

#[async_trait]
pub trait MedicalApi: Send + Sync {
    /// Symptom inference for a free-text message
    async fn chat(&self, message: &str) -> Result<ChatResponse>;

    /// Skin disease classification of a raw image
    async fn classify_image(&self, file: &ImageFile) -> Result<ImageAnalysisResponse>;

    /// Doctors matching a disease and/or symptom
    async fn find_doctors(&self, query: &DoctorQuery) -> Result<DoctorSearchResponse>;

    /// Service banner, used as a health check
    async fn ping(&self) -> Result<ServiceStatus>;
}

#[derive(Debug, Clone)]
pub struct HttpMedicalApi {
    client: Client,
    config: ApiConfig,
}

impl HttpMedicalApi {
    pub fn new(config: ApiConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: ApiConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

#[async_trait]
impl MedicalApi for HttpMedicalApi {
    async fn chat(&self, message: &str) -> Result<ChatResponse> {
        info!(endpoint = %self.config.chat_url, chars = message.len(), "Sending symptom inference request");

        let response = self
            .client
            .post(&self.config.chat_url)
            .json(&ChatRequest { message })
            .send()
            .await
            .inspect_err(|e| error!(endpoint = %self.config.chat_url, error = %e, "Inference request failed"))?;

        decode_json(response).await
    }

    async fn classify_image(&self, file: &ImageFile) -> Result<ImageAnalysisResponse> {
        info!(
            endpoint = %self.config.image_url,
            file = %file.name,
            media_type = %file.media_type,
            bytes = file.bytes.len(),
            "Uploading image for classification"
        );

        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)?;
        let form = multipart::Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(&self.config.image_url)
            .multipart(form)
            .send()
            .await
            .inspect_err(|e| error!(endpoint = %self.config.image_url, error = %e, "Image upload failed"))?;

        decode_json(response).await
    }

    async fn find_doctors(&self, query: &DoctorQuery) -> Result<DoctorSearchResponse> {
        let params = query.params();
        info!(endpoint = %self.config.doctors_url, ?params, "Looking up doctors");

        let response = self
            .client
            .get(&self.config.doctors_url)
            .query(&params)
            .send()
            .await
            .inspect_err(|e| error!(endpoint = %self.config.doctors_url, error = %e, "Doctor lookup failed"))?;

        let found: DoctorSearchResponse = decode_json(response).await?;

        // The backend reports upstream failures in-band with a 200
        if let Some(message) = &found.error {
            error!(endpoint = %self.config.doctors_url, %message, "Doctor service reported an error");
            return Err(ApiError::Service(message.clone()));
        }

        Ok(found)
    }

    async fn ping(&self) -> Result<ServiceStatus> {
        let response = self.client.get(&self.config.health_url).send().await?;
        decode_json(response).await
    }
}

/// Non-2xx becomes [`ApiError::Status`]; otherwise the body is parsed as JSON.
async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let url = response.url().clone();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(%url, status = status.as_u16(), "Request returned an error status");
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await?;
    debug!(%url, status = status.as_u16(), bytes = bytes.len(), "Response received");

    Ok(serde_json::from_slice(&bytes)?)
}
