//! JSON shape returned to callers of the generate endpoint.

use serde::Serialize;

use crate::error::ErrorKind;
use crate::types::GenerationResult;

/// Response body for a generation request.
///
/// Exactly one of `image_url` and `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl GenerateResponse {
    /// Converts a result into a body plus the HTTP status to answer with.
    pub fn from_result(result: &GenerationResult) -> (u16, Self) {
        match result {
            Ok(output) => (
                200,
                Self {
                    image_url: Some(output.output_ref.clone()),
                    error: None,
                    error_kind: None,
                },
            ),
            Err(err) => (
                err.status_code(),
                Self {
                    image_url: None,
                    error: Some(err.to_string()),
                    error_kind: Some(err.kind()),
                },
            ),
        }
    }
}
