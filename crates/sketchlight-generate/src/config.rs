//! Orchestrator configuration.

use std::fmt;
use std::time::Duration;

/// Environment variable holding the provider API token.
pub const API_TOKEN_ENV: &str = "REPLICATE_API_TOKEN";

/// Environment variable overriding the model version.
pub const MODEL_VERSION_ENV: &str = "REPLICATE_FLUX_VERSION";

/// Placeholder model version used when none is configured.
pub const DEFAULT_MODEL_VERSION: &str =
    "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

/// Delay between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1800);

/// Time budget for the polling phase.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Limit on a single upload or create call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Prompt adherence passed to the model.
pub const DEFAULT_GUIDANCE: f64 = 3.5;

/// Settings for a generation run.
#[derive(Clone, PartialEq)]
pub struct GenerateConfig {
    /// Provider API token. `None` disables remote generation.
    pub api_token: Option<String>,
    /// Model version hash.
    pub model_version: String,
    pub poll_interval: Duration,
    /// Time budget for the polling phase, in-flight polls included.
    pub timeout: Duration,
    /// Limit on each upload and create call.
    pub request_timeout: Duration,
    pub guidance: f64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            guidance: DEFAULT_GUIDANCE,
        }
    }
}

impl fmt::Debug for GenerateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerateConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("model_version", &self.model_version)
            .field("poll_interval", &self.poll_interval)
            .field("timeout", &self.timeout)
            .field("request_timeout", &self.request_timeout)
            .field("guidance", &self.guidance)
            .finish()
    }
}

impl GenerateConfig {
    /// Creates a new config builder.
    pub fn builder() -> GenerateConfigBuilder {
        GenerateConfigBuilder::default()
    }

    /// Reads the token and model version from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            api_token: read(API_TOKEN_ENV),
            model_version: read(MODEL_VERSION_ENV)
                .unwrap_or_else(|| DEFAULT_MODEL_VERSION.to_string()),
            ..Self::default()
        }
    }

    /// Returns true if a token is available.
    pub fn is_configured(&self) -> bool {
        self.api_token.is_some()
    }
}

/// Builder for [`GenerateConfig`].
#[derive(Debug, Default)]
pub struct GenerateConfigBuilder {
    api_token: Option<String>,
    model_version: Option<String>,
    poll_interval: Option<Duration>,
    timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    guidance: Option<f64>,
}

impl GenerateConfigBuilder {
    /// Sets the API token.
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Sets the model version.
    pub fn model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = Some(version.into());
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn guidance(mut self, guidance: f64) -> Self {
        self.guidance = Some(guidance);
        self
    }

    /// Builds the config, filling unset fields from the environment and defaults.
    pub fn build(self) -> GenerateConfig {
        let env = GenerateConfig::from_env();
        GenerateConfig {
            api_token: self.api_token.or(env.api_token),
            model_version: self.model_version.unwrap_or(env.model_version),
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            guidance: self.guidance.unwrap_or(DEFAULT_GUIDANCE),
        }
    }
}
