//! Error types for remote generation.

use serde::Serialize;
use std::time::Duration;

/// Errors that end a generation attempt.
///
/// Every variant that originates upstream carries the provider's text verbatim.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateError {
    /// The request itself is unusable (e.g. no image attached).
    #[error("{0}")]
    InvalidInput(String),

    /// No API token is configured; remote generation is disabled.
    #[error("Server model not configured. Set REPLICATE_API_TOKEN to enable image-to-image.")]
    NotConfigured,

    /// The sketch could not be uploaded.
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// The prediction job could not be created.
    #[error("Prediction create failed: {0}")]
    JobCreateFailed(String),

    /// The job ended without a usable result.
    #[error("Prediction {status}{}", detail_suffix(.detail))]
    RemoteJobFailed {
        status: String,
        detail: Option<String>,
    },

    /// The job did not finish within the time budget.
    #[error("Prediction {status} after {elapsed:?}")]
    TimedOut { status: String, elapsed: Duration },

    /// The HTTP client could not be set up locally.
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),

    /// The caller abandoned the generation.
    #[error("Generation cancelled")]
    Cancelled,
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

/// Serializable discriminant of a [`GenerateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidInput,
    NotConfigured,
    UploadFailed,
    JobCreateFailed,
    RemoteJobFailed,
    TimedOut,
    ClientSetup,
    Cancelled,
}

impl GenerateError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotConfigured => ErrorKind::NotConfigured,
            Self::UploadFailed(_) => ErrorKind::UploadFailed,
            Self::JobCreateFailed(_) => ErrorKind::JobCreateFailed,
            Self::RemoteJobFailed { .. } => ErrorKind::RemoteJobFailed,
            Self::TimedOut { .. } => ErrorKind::TimedOut,
            Self::ClientSetup(_) => ErrorKind::ClientSetup,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// HTTP status a hosting layer should answer with.
    ///
    /// Not-configured is a degraded mode rather than a failure and answers 200.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::NotConfigured => 200,
            Self::Cancelled => 499,
            Self::UploadFailed(_)
            | Self::JobCreateFailed(_)
            | Self::RemoteJobFailed { .. }
            | Self::TimedOut { .. }
            | Self::ClientSetup(_) => 500,
        }
    }

    /// Returns true if the failure happened on the provider's side.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UploadFailed(_)
                | Self::JobCreateFailed(_)
                | Self::RemoteJobFailed { .. }
                | Self::TimedOut { .. }
        )
    }
}

/// Failure reported by a [`PredictionService`](crate::PredictionService) call.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    /// HTTP status, when the provider answered at all.
    pub status: Option<u16>,
    /// Provider response text, or the transport error.
    pub message: String,
}

impl ServiceError {
    /// Non-success HTTP answer with the raw response body.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: body.into(),
        }
    }

    /// The request never produced an HTTP answer.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
