//! Configuration domain models.

use serde::{Deserialize, Serialize};

use crate::access::DEFAULT_ACCESS_PIN;
use crate::artifact::OverlayMode;

/// Application configuration, persisted as `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QlensConfig {
    pub access_pin: Option<String>,
    pub default_mode: OverlayMode,
    pub link: LinkConfig,
}

impl QlensConfig {
    /// The PIN the access gate should use: the configured override, or the
    /// built-in default.
    pub fn access_pin(&self) -> &str {
        self.access_pin.as_deref().unwrap_or(DEFAULT_ACCESS_PIN)
    }
}

/// Settings for the backend link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Base URL of the compute backend.
    pub base_url: String,
    /// Per-request timeout for authentication and poll calls.
    pub timeout_secs: u64,
    /// Interval between job status polls.
    pub job_poll_interval_ms: u64,
    /// Maximum number of status polls before a job is abandoned.
    pub job_poll_attempts: u32,
    /// Overall deadline for one remote job (submit + polls).
    pub job_timeout_secs: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            base_url: "https://link.qlens.dev".to_string(),
            timeout_secs: 10,
            job_poll_interval_ms: 250,
            job_poll_attempts: 40,
            job_timeout_secs: 30,
        }
    }
}

/// Secret configuration, loaded from `secret.json`.
///
/// Secrets are never logged; error messages from loading code must not
/// contain them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecretConfig {
    #[serde(default)]
    pub link: Option<LinkSecret>,
    #[serde(default)]
    pub analysis: Option<AnalysisSecret>,
}

/// Credential for the compute backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSecret {
    pub api_token: String,
}

/// Credential and endpoint for the frame-analysis service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSecret {
    pub api_key: String,
    #[serde(default)]
    pub endpoint: Option<String>,
}
