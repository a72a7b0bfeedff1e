//! Request, result and wire types for remote generation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GenerateError;

/// Default prompt offered to users.
pub const DEFAULT_PROMPT: &str =
    "Ultra-realistic photo, soft natural light, cinematic shadows, photoreal textures";

/// Default image strength (closer to 1 relies more on the prompt than the sketch).
pub const DEFAULT_STRENGTH: f64 = 0.6;

/// Outcome of one generation attempt.
pub type GenerationResult = Result<GenerationOutput, GenerateError>;

/// A request to turn a sketch into a rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Encoded sketch file (PNG, JPEG, ...), sent as-is.
    pub image: Vec<u8>,
    /// Text prompt.
    pub prompt: String,
    /// Image strength (0.0 to 1.0).
    pub strength: f64,
    /// Seed for deterministic generation, 0 lets the provider choose.
    pub seed: u64,
}

impl GenerationRequest {
    /// Creates a request with the default strength and a random seed.
    pub fn new(image: impl Into<Vec<u8>>, prompt: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            prompt: prompt.into(),
            strength: DEFAULT_STRENGTH,
            seed: 0,
        }
    }

    /// Sets the image strength.
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds a request from submitted form fields.
    ///
    /// Missing `strength` and `seed` fall back to 0.6 and 0; a missing prompt
    /// is sent empty.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::InvalidInput` when the image is missing or a
    /// numeric field doesn't parse.
    pub fn from_form(
        image: Option<Vec<u8>>,
        prompt: Option<&str>,
        strength: Option<&str>,
        seed: Option<&str>,
    ) -> Result<Self, GenerateError> {
        let image = image
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| GenerateError::InvalidInput("Missing image".into()))?;

        let strength = match non_empty(strength) {
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|s| s.is_finite())
                .ok_or_else(|| GenerateError::InvalidInput(format!("Invalid strength: {raw}")))?,
            None => DEFAULT_STRENGTH,
        };

        let seed = match non_empty(seed) {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| GenerateError::InvalidInput(format!("Invalid seed: {raw}")))?,
            None => 0,
        };

        Ok(Self {
            image,
            prompt: prompt.unwrap_or_default().to_string(),
            strength,
            seed,
        })
    }

    /// Seed to send upstream, omitted when unspecified.
    pub fn seed_param(&self) -> Option<u64> {
        (self.seed != 0).then_some(self.seed)
    }
}

fn non_empty(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|s| !s.is_empty())
}

/// A finished rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutput {
    /// URI of the generated image.
    pub output_ref: String,
}

/// Uploaded asset as returned by the file endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    pub url: String,
}

/// Body of a prediction-create call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePrediction {
    /// Model version hash.
    pub version: String,
    pub input: PredictionInput,
}

/// Model inputs for an image-to-image prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionInput {
    /// Public URL of the uploaded sketch.
    pub image: String,
    pub prompt: String,
    pub strength: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub guidance: f64,
}

/// A prediction job record, from either create or poll responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub urls: Option<PredictionUrls>,
    #[serde(default)]
    pub output: Option<PredictionOutput>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl Prediction {
    /// Job with only a status, as most poll responses look.
    pub fn with_status(status: JobStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// The job's own poll URL.
    pub fn poll_url(&self) -> Option<&str> {
        self.urls.as_ref().and_then(|u| u.get.as_deref())
    }

    /// First output reference, whichever shape the output has.
    pub fn output_ref(&self) -> Option<&str> {
        self.output.as_ref().and_then(PredictionOutput::first)
    }

    /// Provider error text, if any.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Endpoints attached to a prediction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PredictionUrls {
    #[serde(default)]
    pub get: Option<String>,
    #[serde(default)]
    pub cancel: Option<String>,
}

/// Prediction output: a single reference or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutput {
    Single(String),
    Many(Vec<String>),
    Other(serde_json::Value),
}

impl PredictionOutput {
    /// The single image reference this output designates.
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(url) => Some(url),
            Self::Many(urls) => urls.first().map(String::as_str),
            Self::Other(_) => None,
        }
    }
}

/// Lifecycle state of a prediction job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum JobStatus {
    Starting,
    Queued,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Unknown(String),
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::Unknown("unknown".into())
    }
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Starting => "starting",
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Unknown(s) => s,
        }
    }

    /// Returns true once the job will not change any more.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "starting" => Self::Starting,
            "queued" => Self::Queued,
            "processing" => Self::Processing,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            _ => Self::Unknown(value),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
