//! RemoteBackend - REST client for the external compute backend.
//!
//! Authentication is a single `POST` exchanging the API token for a session
//! identifier. A job is a submission followed by a status poll loop that
//! ultimately yields a bit-string result. All diagnostics surfaced from here
//! are truncated and never contain the credential.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use qlens_core::config::LinkConfig;
use qlens_core::link::ApiToken;
use qlens_core::register::BitRegister;
use qlens_core::{QlensError, Result};

use crate::backend::{JobBackend, LinkAuthenticator};

const MAX_DETAIL_LEN: usize = 160;

/// Client for the compute backend identified by `LinkConfig::base_url`.
#[derive(Clone)]
pub struct RemoteBackend {
    client: Client,
    base_url: String,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl RemoteBackend {
    /// Creates a backend client from link settings.
    ///
    /// The per-request timeout is carried by the client itself, so a
    /// transport that never answers resolves as an error instead of hanging.
    pub fn new(config: &LinkConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| QlensError::internal(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(config.job_poll_interval_ms),
            poll_attempts: config.job_poll_attempts,
        })
    }

    async fn submit_job(&self, session_id: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/v1/jobs", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&SubmitJobRequest {
                session_id,
                register_length: qlens_core::register::REGISTER_LEN,
            })
            .send()
            .await
            .map_err(|err| QlensError::job_interrupted(format!("job submission failed: {err}")))?;

        if !response.status().is_success() {
            return Err(Self::job_http_error("job submission", response).await);
        }

        let parsed: SubmitJobResponse = response.json().await.map_err(|err| {
            QlensError::job_interrupted(format!("malformed job submission response: {err}"))
        })?;

        Ok(parsed.job_id)
    }

    async fn fetch_job_status(&self, job_id: &str) -> Result<JobStatusResponse> {
        let response = self
            .client
            .get(format!("{}/v1/jobs/{}", self.base_url, job_id))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| QlensError::job_interrupted(format!("job poll failed: {err}")))?;

        if !response.status().is_success() {
            return Err(Self::job_http_error("job poll", response).await);
        }

        response.json().await.map_err(|err| {
            QlensError::job_interrupted(format!("malformed job status response: {err}"))
        })
    }

    async fn job_http_error(context: &str, response: reqwest::Response) -> QlensError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        QlensError::job_interrupted(format!(
            "{context} returned {status}: {}",
            truncate_detail(&body)
        ))
    }
}

#[async_trait]
impl LinkAuthenticator for RemoteBackend {
    async fn authenticate(&self, token: &ApiToken) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/v1/link/sessions", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&AuthRequest {
                api_token: token.expose(),
            })
            .send()
            .await
            .map_err(|err| {
                QlensError::link_unreachable(format!("authentication request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(map_auth_error(status, &body));
        }

        let parsed: AuthResponse = response.json().await.map_err(|err| {
            QlensError::link_unreachable(format!("malformed authentication response: {err}"))
        })?;

        Ok(parsed.session_id)
    }
}

#[async_trait]
impl JobBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn execute(&self, session_id: Option<&str>) -> Result<BitRegister> {
        let session_id = session_id
            .ok_or_else(|| QlensError::internal("remote job dispatched without a session"))?;

        let job_id = self.submit_job(session_id).await?;
        tracing::debug!(job_id, "remote job submitted");

        for _ in 0..self.poll_attempts {
            let status = self.fetch_job_status(&job_id).await?;
            match status.status {
                JobState::Queued | JobState::Running => {
                    tokio::time::sleep(self.poll_interval).await;
                }
                JobState::Done => {
                    let bits = status.result.ok_or_else(|| {
                        QlensError::job_interrupted("completed job carried no result")
                    })?;
                    return bits
                        .parse()
                        .map_err(|_| QlensError::job_interrupted(format!(
                            "backend returned an invalid register: {}",
                            truncate_detail(&bits)
                        )));
                }
                JobState::Failed => {
                    let detail = status.error.unwrap_or_else(|| "no detail".to_string());
                    return Err(QlensError::job_interrupted(truncate_detail(&detail)));
                }
            }
        }

        Err(QlensError::job_interrupted(format!(
            "job {job_id} did not complete within {} polls",
            self.poll_attempts
        )))
    }
}

#[derive(Serialize)]
struct AuthRequest<'a> {
    #[serde(rename = "apiToken")]
    api_token: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    #[serde(rename = "sessionId")]
    session_id: String,
}

#[derive(Serialize)]
struct SubmitJobRequest<'a> {
    #[serde(rename = "sessionId")]
    session_id: &'a str,
    #[serde(rename = "registerLength")]
    register_length: usize,
}

#[derive(Deserialize)]
struct SubmitJobResponse {
    #[serde(rename = "jobId")]
    job_id: String,
}

#[derive(Deserialize)]
struct JobStatusResponse {
    status: JobState,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum JobState {
    Queued,
    Running,
    Done,
    Failed,
}

fn map_auth_error(status: StatusCode, body: &str) -> QlensError {
    // An explicit HTTP response is a rejection; only transport failures
    // count as the link being unreachable.
    QlensError::credential_rejected(format!("{status}: {}", truncate_detail(body)))
}

fn truncate_detail(detail: &str) -> String {
    let trimmed = detail.trim();
    if trimmed.chars().count() <= MAX_DETAIL_LEN {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(MAX_DETAIL_LEN).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_request_wire_format() {
        let body = serde_json::to_value(AuthRequest { api_token: "tok" }).unwrap();
        assert_eq!(body, serde_json::json!({ "apiToken": "tok" }));
    }

    #[test]
    fn test_job_status_parses_all_states() {
        let done: JobStatusResponse =
            serde_json::from_str(r#"{"status":"done","result":"0101010101"}"#).unwrap();
        assert_eq!(done.status, JobState::Done);
        assert_eq!(done.result.as_deref(), Some("0101010101"));

        let failed: JobStatusResponse =
            serde_json::from_str(r#"{"status":"failed","error":"calibration drift"}"#).unwrap();
        assert_eq!(failed.status, JobState::Failed);

        let queued: JobStatusResponse = serde_json::from_str(r#"{"status":"queued"}"#).unwrap();
        assert_eq!(queued.status, JobState::Queued);
        assert!(queued.result.is_none());
    }

    #[test]
    fn test_auth_error_is_rejection_with_truncated_detail() {
        let long_body = "x".repeat(500);
        let err = map_auth_error(StatusCode::UNAUTHORIZED, &long_body);
        assert!(err.is_credential_rejected());
        // 160 chars of payload plus the ellipsis marker
        if let QlensError::CredentialRejected { detail } = err {
            assert!(detail.chars().count() < 200);
            assert!(detail.ends_with('…'));
        }
    }

    #[test]
    fn test_truncate_detail_keeps_short_strings() {
        assert_eq!(truncate_detail("  short  "), "short");
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let config = LinkConfig {
            base_url: "http://localhost:7016/".to_string(),
            ..LinkConfig::default()
        };
        let backend = RemoteBackend::new(&config).unwrap();
        assert_eq!(backend.base_url, "http://localhost:7016");
    }
}
