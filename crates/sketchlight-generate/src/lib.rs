//! Sketchlight Generate - remote sketch-to-photo rendering
//!
//! Sends a sketch and prompt to a hosted image-to-image model and waits for
//! the result. A run uploads the sketch, creates a prediction job, then polls
//! the job's own status URL on a fixed interval until it reaches a terminal
//! state or the time budget runs out.
//!
//! The provider sits behind the [`PredictionService`] trait; [`ReplicateClient`]
//! is the HTTP implementation.
//!
//! ```ignore
//! let orchestrator = Orchestrator::from_env()?;
//! let request = GenerationRequest::new(std::fs::read("sketch.png")?, DEFAULT_PROMPT);
//! let output = orchestrator.generate(request).await?;
//! println!("{}", output.output_ref);
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod replicate;
pub mod response;
pub mod service;
pub mod types;

pub use config::GenerateConfig;
pub use error::{ErrorKind, GenerateError, ServiceError};
pub use orchestrator::Orchestrator;
pub use replicate::ReplicateClient;
pub use response::GenerateResponse;
pub use service::PredictionService;
pub use types::{
    GenerationOutput, GenerationRequest, GenerationResult, JobStatus, DEFAULT_PROMPT,
    DEFAULT_STRENGTH,
};
