//! Replicate HTTP client.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::API_TOKEN_ENV;
use crate::error::{GenerateError, ServiceError};
use crate::service::PredictionService;
use crate::types::{CreatePrediction, Prediction, UploadedFile};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.replicate.com/v1";

/// Default limit on a single HTTP request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for [`ReplicateClient`].
#[derive(Debug, Clone, Default)]
pub struct ReplicateClientBuilder {
    api_token: Option<String>,
    base_url: Option<String>,
    http_timeout: Option<Duration>,
}

impl ReplicateClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Overrides the API root, e.g. for a proxy.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Per-request timeout, 30 seconds unless set.
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Builds the client, falling back to `REPLICATE_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::NotConfigured` when no token is available, or
    /// `GenerateError::ClientSetup` if the HTTP client can't be built.
    pub fn build(self) -> Result<ReplicateClient, GenerateError> {
        let api_token = self
            .api_token
            .or_else(|| std::env::var(API_TOKEN_ENV).ok())
            .filter(|t| !t.trim().is_empty())
            .ok_or(GenerateError::NotConfigured)?;

        let http_timeout = self.http_timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT);
        let client = reqwest::Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|e| GenerateError::ClientSetup(e.to_string()))?;

        Ok(ReplicateClient {
            client,
            api_token,
            http_timeout,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// Client for Replicate's file and prediction endpoints.
pub struct ReplicateClient {
    client: reqwest::Client,
    api_token: String,
    http_timeout: Duration,
    base_url: String,
}

impl ReplicateClient {
    pub fn builder() -> ReplicateClientBuilder {
        ReplicateClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Limit applied to every request this client sends.
    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_token)
    }
}

/// Turns a non-success response into a [`ServiceError`] carrying the raw body.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(ServiceError::http(status.as_u16(), text));
    }
    Ok(response)
}

#[async_trait]
impl PredictionService for ReplicateClient {
    async fn upload(&self, bytes: Vec<u8>) -> Result<UploadedFile, ServiceError> {
        let url = format!("{}/files", self.base_url);
        tracing::debug!(url = %url, size = bytes.len(), "Uploading sketch");

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .body(bytes)
            .send()
            .await?;

        let file: UploadedFile = check_status(response).await?.json().await?;
        tracing::debug!(file_id = %file.id, "Upload complete");
        Ok(file)
    }

    async fn create_prediction(&self, body: &CreatePrediction) -> Result<Prediction, ServiceError> {
        let url = format!("{}/predictions", self.base_url);
        tracing::debug!(url = %url, version = %body.version, "Creating prediction");

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .json(body)
            .send()
            .await?;

        let prediction: Prediction = check_status(response).await?.json().await?;
        tracing::debug!(
            id = prediction.id.as_deref().unwrap_or("-"),
            status = %prediction.status,
            "Prediction created"
        );
        Ok(prediction)
    }

    async fn get_prediction(&self, poll_url: &str) -> Result<Prediction, ServiceError> {
        let response = self
            .client
            .get(poll_url)
            .header("Authorization", self.bearer())
            .send()
            .await?;

        let prediction: Prediction = check_status(response).await?.json().await?;
        tracing::debug!(status = %prediction.status, "Polled prediction");
        Ok(prediction)
    }
}
