//! Upload, create and poll sequencing for one generation.
//!
//! A run moves through a fixed sequence of states:
//!
//! ```text
//! IDLE -> UPLOADING -> CREATING_JOB -> POLLING -> SUCCEEDED
//!                                              -> REMOTE_FAILED
//!                                              -> TIMED_OUT
//! ```
//!
//! Upload and create failures end the run immediately; neither step is
//! retried. Polling uses a fixed interval and stops at the first terminal
//! status or once the time budget is spent. Every path yields a
//! [`GenerationResult`]; nothing panics past this boundary.

use std::future::Future;
use tokio::time::Instant;

use crate::config::GenerateConfig;
use crate::error::GenerateError;
use crate::replicate::ReplicateClient;
use crate::service::PredictionService;
use crate::types::{
    CreatePrediction, GenerationOutput, GenerationRequest, GenerationResult, JobStatus,
    Prediction, PredictionInput,
};

/// Drives a generation request against a [`PredictionService`].
pub struct Orchestrator<S> {
    service: S,
    config: GenerateConfig,
}

/// An accepted remote job, owned by a single run.
#[derive(Debug)]
struct JobHandle {
    id: Option<String>,
    poll_url: String,
    status: JobStatus,
    output_ref: Option<String>,
}

impl JobHandle {
    fn from_created(prediction: Prediction) -> Result<Self, GenerateError> {
        let poll_url = prediction
            .poll_url()
            .ok_or_else(|| GenerateError::JobCreateFailed("response has no poll URL".into()))?
            .to_string();
        Ok(Self {
            output_ref: prediction.output_ref().map(str::to_string),
            id: prediction.id,
            poll_url,
            status: prediction.status,
        })
    }

    fn update(&mut self, prediction: &Prediction) {
        self.status = prediction.status.clone();
        self.output_ref = prediction.output_ref().map(str::to_string);
    }
}

impl Orchestrator<ReplicateClient> {
    /// Builds an orchestrator for Replicate from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::NotConfigured` when no API token is set.
    pub fn from_env() -> Result<Self, GenerateError> {
        let config = GenerateConfig::from_env();
        let token = config.api_token.clone().ok_or(GenerateError::NotConfigured)?;
        let client = ReplicateClient::builder().api_token(token).build()?;
        Ok(Self::new(client, config))
    }
}

impl<S: PredictionService> Orchestrator<S> {
    pub fn new(service: S, config: GenerateConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &GenerateConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Runs a generation to completion or until the time budget runs out.
    pub async fn generate(&self, request: GenerationRequest) -> GenerationResult {
        self.generate_with_cancel(request, std::future::pending()).await
    }

    /// Like [`generate`](Self::generate), but gives up as soon as `cancel`
    /// completes.
    ///
    /// A cancelled run returns `GenerateError::Cancelled` without waiting
    /// for the remote job. The job itself is left running upstream.
    pub async fn generate_with_cancel<C>(
        &self,
        request: GenerationRequest,
        cancel: C,
    ) -> GenerationResult
    where
        C: Future<Output = ()>,
    {
        let run = self.run(request);
        tokio::pin!(run);
        tokio::pin!(cancel);

        tokio::select! {
            biased;
            result = &mut run => result,
            () = &mut cancel => {
                tracing::warn!("Generation cancelled");
                Err(GenerateError::Cancelled)
            }
        }
    }

    async fn run(&self, request: GenerationRequest) -> GenerationResult {
        if request.image.is_empty() {
            return Err(GenerateError::InvalidInput("Missing image".into()));
        }
        if !self.config.is_configured() {
            tracing::warn!("No API token configured, skipping remote generation");
            return Err(GenerateError::NotConfigured);
        }

        let seed = request.seed_param();
        let request_timeout = self.config.request_timeout;
        let uploaded = tokio::time::timeout(request_timeout, self.service.upload(request.image))
            .await
            .map_err(|_| GenerateError::UploadFailed(timed_out_message(request_timeout)))?
            .map_err(|e| GenerateError::UploadFailed(e.message))?;
        tracing::info!(file_id = %uploaded.id, "Sketch uploaded");

        let body = CreatePrediction {
            version: self.config.model_version.clone(),
            input: PredictionInput {
                image: uploaded.url,
                prompt: request.prompt,
                strength: request.strength,
                seed,
                guidance: self.config.guidance,
            },
        };
        let created = tokio::time::timeout(request_timeout, self.service.create_prediction(&body))
            .await
            .map_err(|_| GenerateError::JobCreateFailed(timed_out_message(request_timeout)))?
            .map_err(|e| GenerateError::JobCreateFailed(e.message))?;

        let job = JobHandle::from_created(created)?;
        tracing::info!(
            id = job.id.as_deref().unwrap_or("-"),
            status = %job.status,
            "Prediction accepted"
        );

        self.poll(job).await
    }

    async fn poll(&self, mut job: JobHandle) -> GenerationResult {
        let start = Instant::now();
        let mut polls = 0u32;

        while !job.status.is_terminal() && start.elapsed() < self.config.timeout {
            tokio::time::sleep(self.config.poll_interval).await;

            // An in-flight poll gets what is left of the budget, but never less
            // than one interval
            let limit = self
                .config
                .timeout
                .saturating_sub(start.elapsed())
                .max(self.config.poll_interval);
            let polled =
                tokio::time::timeout(limit, self.service.get_prediction(&job.poll_url)).await;

            let prediction = match polled {
                Ok(Ok(p)) => p,
                Err(_) => {
                    let elapsed = start.elapsed();
                    tracing::warn!(polls, ?elapsed, "Poll request exceeded the time budget");
                    return Err(GenerateError::TimedOut {
                        status: job.status.to_string(),
                        elapsed,
                    });
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Poll failed");
                    return Err(GenerateError::RemoteJobFailed {
                        status: job.status.to_string(),
                        detail: Some(e.message),
                    });
                }
            };
            polls += 1;
            job.update(&prediction);
            tracing::debug!(poll = polls, status = %job.status, "Prediction status");

            if matches!(job.status, JobStatus::Failed | JobStatus::Canceled) {
                return Err(GenerateError::RemoteJobFailed {
                    status: job.status.to_string(),
                    detail: prediction.error_message(),
                });
            }
        }

        match (&job.status, job.output_ref) {
            (JobStatus::Succeeded, Some(output_ref)) => {
                tracing::info!(polls, elapsed = ?start.elapsed(), "Prediction succeeded");
                Ok(GenerationOutput { output_ref })
            }
            (status, _) if status.is_terminal() => Err(GenerateError::RemoteJobFailed {
                status: status.to_string(),
                detail: None,
            }),
            (status, _) => {
                let elapsed = start.elapsed();
                tracing::warn!(polls, ?elapsed, status = %status, "Prediction timed out");
                Err(GenerateError::TimedOut {
                    status: status.to_string(),
                    elapsed,
                })
            }
        }
    }
}

fn timed_out_message(limit: std::time::Duration) -> String {
    format!("request timed out after {limit:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ServiceError};
    use crate::types::{PredictionOutput, PredictionUrls, UploadedFile};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Remote call that never answers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Hang {
        Upload,
        Create,
        Poll,
    }

    /// Service stand-in that replays scripted responses and records calls.
    #[derive(Default)]
    struct ScriptedService {
        hang: Option<Hang>,
        uploads: Mutex<VecDeque<Result<UploadedFile, ServiceError>>>,
        creates: Mutex<VecDeque<Result<Prediction, ServiceError>>>,
        polls: Mutex<VecDeque<Result<Prediction, ServiceError>>>,
        upload_calls: Mutex<Vec<usize>>,
        create_calls: Mutex<Vec<CreatePrediction>>,
        poll_calls: Mutex<Vec<String>>,
    }

    impl ScriptedService {
        fn upload_ok(self, id: &str, url: &str) -> Self {
            self.uploads.lock().unwrap().push_back(Ok(UploadedFile {
                id: id.into(),
                url: url.into(),
            }));
            self
        }

        fn upload_err(self, err: ServiceError) -> Self {
            self.uploads.lock().unwrap().push_back(Err(err));
            self
        }

        fn create(self, result: Result<Prediction, ServiceError>) -> Self {
            self.creates.lock().unwrap().push_back(result);
            self
        }

        fn poll(self, result: Result<Prediction, ServiceError>) -> Self {
            self.polls.lock().unwrap().push_back(result);
            self
        }

        fn hang_on(mut self, stage: Hang) -> Self {
            self.hang = Some(stage);
            self
        }

        fn counts(&self) -> (usize, usize, usize) {
            (
                self.upload_calls.lock().unwrap().len(),
                self.create_calls.lock().unwrap().len(),
                self.poll_calls.lock().unwrap().len(),
            )
        }
    }

    #[async_trait]
    impl PredictionService for ScriptedService {
        async fn upload(&self, bytes: Vec<u8>) -> Result<UploadedFile, ServiceError> {
            self.upload_calls.lock().unwrap().push(bytes.len());
            if self.hang == Some(Hang::Upload) {
                return std::future::pending().await;
            }
            self.uploads
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ServiceError::transport("unscripted upload")))
        }

        async fn create_prediction(
            &self,
            body: &CreatePrediction,
        ) -> Result<Prediction, ServiceError> {
            self.create_calls.lock().unwrap().push(body.clone());
            if self.hang == Some(Hang::Create) {
                return std::future::pending().await;
            }
            self.creates
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ServiceError::transport("unscripted create")))
        }

        async fn get_prediction(&self, poll_url: &str) -> Result<Prediction, ServiceError> {
            self.poll_calls.lock().unwrap().push(poll_url.to_string());
            if self.hang == Some(Hang::Poll) && self.polls.lock().unwrap().is_empty() {
                return std::future::pending().await;
            }
            // Once the script runs out the job just keeps processing
            self.polls
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(status(JobStatus::Processing)))
        }
    }

    fn configured() -> GenerateConfig {
        GenerateConfig {
            api_token: Some("r8_test".into()),
            ..GenerateConfig::default()
        }
    }

    fn status(status: JobStatus) -> Prediction {
        Prediction::with_status(status)
    }

    fn accepted(poll_url: &str) -> Prediction {
        Prediction {
            id: Some("job-1".into()),
            status: JobStatus::Processing,
            urls: Some(PredictionUrls {
                get: Some(poll_url.into()),
                cancel: None,
            }),
            ..Prediction::default()
        }
    }

    fn succeeded(output: PredictionOutput) -> Prediction {
        Prediction {
            status: JobStatus::Succeeded,
            output: Some(output),
            ..Prediction::default()
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(vec![7u8; 200 * 100], "x")
    }

    // ===== Precondition Tests =====

    #[tokio::test(start_paused = true)]
    async fn test_not_configured_makes_no_calls() {
        let orchestrator = Orchestrator::new(ScriptedService::default(), GenerateConfig::default());
        let err = orchestrator.generate(request()).await.unwrap_err();
        assert_eq!(err, GenerateError::NotConfigured);
        assert_eq!(err.status_code(), 200);
        assert_eq!(orchestrator.service().counts(), (0, 0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_image_is_invalid_input() {
        let orchestrator = Orchestrator::new(ScriptedService::default(), configured());
        let err = orchestrator
            .generate(GenerationRequest::new(Vec::new(), "x"))
            .await
            .unwrap_err();
        assert_eq!(err, GenerateError::InvalidInput("Missing image".into()));
        assert_eq!(orchestrator.service().counts(), (0, 0, 0));
    }

    // ===== Upload / Create Tests =====

    #[tokio::test(start_paused = true)]
    async fn test_upload_failure_stops_run() {
        let service =
            ScriptedService::default().upload_err(ServiceError::http(401, "Unauthenticated"));
        let orchestrator = Orchestrator::new(service, configured());

        let err = orchestrator.generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UploadFailed);
        assert_eq!(err.to_string(), "Upload failed: Unauthenticated");
        assert_eq!(orchestrator.service().counts(), (1, 0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_failure_stops_run() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Err(ServiceError::http(422, "invalid version")));
        let orchestrator = Orchestrator::new(service, configured());

        let err = orchestrator.generate(request()).await.unwrap_err();
        assert_eq!(
            err,
            GenerateError::JobCreateFailed("invalid version".into())
        );
        assert_eq!(orchestrator.service().counts(), (1, 1, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_without_poll_url() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(status(JobStatus::Starting)));
        let orchestrator = Orchestrator::new(service, configured());

        let err = orchestrator.generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::JobCreateFailed);
        assert_eq!(orchestrator.service().counts(), (1, 1, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_payload() {
        let service = ScriptedService::default()
            .upload_ok("a", "https://files/u")
            .create(Ok(accepted("p")))
            .poll(Ok(succeeded(PredictionOutput::Single("out.png".into()))));
        let orchestrator = Orchestrator::new(service, configured());

        orchestrator
            .generate(request().with_strength(0.8).with_seed(99))
            .await
            .unwrap();

        let calls = orchestrator.service().create_calls.lock().unwrap();
        let body = &calls[0];
        assert_eq!(body.version, orchestrator.config().model_version);
        assert_eq!(body.input.image, "https://files/u");
        assert_eq!(body.input.strength, 0.8);
        assert_eq!(body.input.seed, Some(99));
        assert_eq!(body.input.guidance, 3.5);
    }

    // ===== Polling Tests =====

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_scenario() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(accepted("p")))
            .poll(Ok(status(JobStatus::Processing)))
            .poll(Ok(succeeded(PredictionOutput::Many(vec!["out.png".into()]))));
        let orchestrator = Orchestrator::new(service, configured());

        let req = GenerationRequest::new(vec![0u8; 200 * 100], "x")
            .with_strength(0.6)
            .with_seed(0);
        let output = orchestrator.generate(req).await.unwrap();
        assert_eq!(output.output_ref, "out.png");

        let service = orchestrator.service();
        assert_eq!(service.counts(), (1, 1, 2));
        assert_eq!(*service.upload_calls.lock().unwrap(), vec![20_000]);
        assert!(service.poll_calls.lock().unwrap().iter().all(|url| url == "p"));

        let body = serde_json::to_value(&service.create_calls.lock().unwrap()[0]).unwrap();
        assert_eq!(body["input"]["image"], "u");
        assert_eq!(body["input"]["prompt"], "x");
        assert_eq!(body["input"]["guidance"], 3.5);
        assert!(body["input"].get("seed").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_third_poll() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(accepted("p")))
            .poll(Ok(status(JobStatus::Queued)))
            .poll(Ok(status(JobStatus::Processing)))
            .poll(Ok(succeeded(PredictionOutput::Many(vec![
                "first.png".into(),
                "second.png".into(),
            ]))));
        let orchestrator = Orchestrator::new(service, configured());

        let output = orchestrator.generate(request()).await.unwrap();
        assert_eq!(output.output_ref, "first.png");
        assert_eq!(orchestrator.service().counts(), (1, 1, 3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_string_output() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(accepted("p")))
            .poll(Ok(succeeded(PredictionOutput::Single("one.png".into()))));
        let orchestrator = Orchestrator::new(service, configured());

        let output = orchestrator.generate(request()).await.unwrap();
        assert_eq!(output.output_ref, "one.png");
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_wait_fixed_interval() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(accepted("p")))
            .poll(Ok(status(JobStatus::Processing)))
            .poll(Ok(succeeded(PredictionOutput::Single("out.png".into()))));
        let orchestrator = Orchestrator::new(service, configured());

        let start = Instant::now();
        orchestrator.generate(request()).await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(3600));
        assert!(elapsed < Duration::from_millis(3700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_when_never_terminal() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(accepted("p")));
        let orchestrator = Orchestrator::new(service, configured());

        let err = orchestrator.generate(request()).await.unwrap_err();
        match err {
            GenerateError::TimedOut { status, elapsed } => {
                assert_eq!(status, "processing");
                assert!(elapsed >= Duration::from_secs(60));
            }
            other => panic!("expected TimedOut, got {other:?}"),
        }
        // Polls start at 1.8s, 3.6s, ... up to 61.2s; the 34th begins at 59.4s
        assert_eq!(orchestrator.service().counts(), (1, 1, 34));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_timeout() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(accepted("p")));
        let config = GenerateConfig {
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(3),
            ..configured()
        };
        let orchestrator = Orchestrator::new(service, config);

        let err = orchestrator.generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimedOut);
        assert_eq!(orchestrator.service().counts(), (1, 1, 3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_poll_times_out_within_budget() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(accepted("p")))
            .hang_on(Hang::Poll);
        let orchestrator = Orchestrator::new(service, configured());

        let result = tokio::time::timeout(
            Duration::from_secs(3600),
            orchestrator.generate(request()),
        )
        .await
        .expect("generate must finish within the budget");

        match result.unwrap_err() {
            GenerateError::TimedOut { status, elapsed } => {
                assert_eq!(status, "processing");
                // First poll starts at 1.8s and gets the remaining 58.2s
                assert!(elapsed >= Duration::from_secs(60));
                assert!(elapsed < Duration::from_secs(61));
            }
            other => panic!("expected TimedOut, got {other:?}"),
        }
        assert_eq!(orchestrator.service().counts(), (1, 1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_poll_after_progress() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(accepted("p")))
            .poll(Ok(status(JobStatus::Processing)))
            .poll(Ok(status(JobStatus::Processing)))
            .hang_on(Hang::Poll);
        let orchestrator = Orchestrator::new(service, configured());

        let start = Instant::now();
        let err = orchestrator.generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(61));
        assert_eq!(orchestrator.service().counts(), (1, 1, 3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_upload_fails_after_request_timeout() {
        let service = ScriptedService::default().hang_on(Hang::Upload);
        let orchestrator = Orchestrator::new(service, configured());

        let start = Instant::now();
        let err = orchestrator.generate(request()).await.unwrap_err();
        assert_eq!(
            err,
            GenerateError::UploadFailed("request timed out after 30s".into())
        );
        assert!(start.elapsed() >= Duration::from_secs(30));
        assert_eq!(orchestrator.service().counts(), (1, 0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_create_fails_after_request_timeout() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .hang_on(Hang::Create);
        let config = GenerateConfig {
            request_timeout: Duration::from_secs(5),
            ..configured()
        };
        let orchestrator = Orchestrator::new(service, config);

        let err = orchestrator.generate(request()).await.unwrap_err();
        assert_eq!(
            err,
            GenerateError::JobCreateFailed("request timed out after 5s".into())
        );
        assert_eq!(orchestrator.service().counts(), (1, 1, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_carries_detail() {
        let failed = Prediction {
            status: JobStatus::Failed,
            error: Some(serde_json::json!("NSFW content detected")),
            ..Prediction::default()
        };
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(accepted("p")))
            .poll(Ok(failed));
        let orchestrator = Orchestrator::new(service, configured());

        let err = orchestrator.generate(request()).await.unwrap_err();
        assert_eq!(
            err,
            GenerateError::RemoteJobFailed {
                status: "failed".into(),
                detail: Some("NSFW content detected".into()),
            }
        );
        assert_eq!(orchestrator.service().counts(), (1, 1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_canceled_job_is_terminal() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(accepted("p")))
            .poll(Ok(status(JobStatus::Canceled)));
        let orchestrator = Orchestrator::new(service, configured());

        let err = orchestrator.generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteJobFailed);
        assert_eq!(orchestrator.service().counts(), (1, 1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeded_without_output() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(accepted("p")))
            .poll(Ok(succeeded(PredictionOutput::Many(Vec::new()))));
        let orchestrator = Orchestrator::new(service, configured());

        let err = orchestrator.generate(request()).await.unwrap_err();
        assert_eq!(
            err,
            GenerateError::RemoteJobFailed {
                status: "succeeded".into(),
                detail: None,
            }
        );
        assert_eq!(err.to_string(), "Prediction succeeded");
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_error_keeps_upstream_text() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(accepted("p")))
            .poll(Ok(status(JobStatus::Processing)))
            .poll(Err(ServiceError::http(502, "Bad Gateway")));
        let orchestrator = Orchestrator::new(service, configured());

        let err = orchestrator.generate(request()).await.unwrap_err();
        assert_eq!(
            err,
            GenerateError::RemoteJobFailed {
                status: "processing".into(),
                detail: Some("Bad Gateway".into()),
            }
        );
        assert_eq!(orchestrator.service().counts(), (1, 1, 2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_succeeded_at_create() {
        let mut created = accepted("p");
        created.status = JobStatus::Succeeded;
        created.output = Some(PredictionOutput::Single("fast.png".into()));
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(created));
        let orchestrator = Orchestrator::new(service, configured());

        let output = orchestrator.generate(request()).await.unwrap();
        assert_eq!(output.output_ref, "fast.png");
        assert_eq!(orchestrator.service().counts(), (1, 1, 0));
    }

    // ===== Cancellation Tests =====

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_poll_loop() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(accepted("p")));
        let orchestrator = Orchestrator::new(service, configured());

        let cancel = tokio::time::sleep(Duration::from_secs(5));
        let err = orchestrator
            .generate_with_cancel(request(), cancel)
            .await
            .unwrap_err();
        assert_eq!(err, GenerateError::Cancelled);
        // Polls at 1.8s and 3.6s; the third would be at 5.4s
        assert_eq!(orchestrator.service().counts(), (1, 1, 2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_completion_is_ignored() {
        let service = ScriptedService::default()
            .upload_ok("a", "u")
            .create(Ok(accepted("p")))
            .poll(Ok(succeeded(PredictionOutput::Single("out.png".into()))));
        let orchestrator = Orchestrator::new(service, configured());

        let cancel = tokio::time::sleep(Duration::from_secs(30));
        let output = orchestrator
            .generate_with_cancel(request(), cancel)
            .await
            .unwrap();
        assert_eq!(output.output_ref, "out.png");
    }
}
