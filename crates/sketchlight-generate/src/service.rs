//! The remote prediction service seam.

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::types::{CreatePrediction, Prediction, UploadedFile};

/// A hosted inference provider that runs image-to-image jobs.
///
/// Implementations are plain transports: they report what the provider said
/// and leave retries, polling and timeouts to the orchestrator.
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Uploads a file and returns its public reference.
    async fn upload(&self, bytes: Vec<u8>) -> Result<UploadedFile, ServiceError>;

    /// Starts a prediction job.
    async fn create_prediction(&self, body: &CreatePrediction) -> Result<Prediction, ServiceError>;

    /// Fetches the current state of a job from its poll URL.
    async fn get_prediction(&self, poll_url: &str) -> Result<Prediction, ServiceError>;
}
