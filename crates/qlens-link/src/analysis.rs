//! FrameAnalyzer - multimodal inference boundary.
//!
//! Sends a still frame plus a text prompt embedding the current overlay mode
//! and weight to an external inference endpoint and returns free text.
//! Entirely independent of the link session and job executor.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use qlens_core::artifact::OverlayMode;
use qlens_core::config::AnalysisSecret;
use qlens_core::{QlensError, Result};

const DEFAULT_ENDPOINT: &str = "https://vision.qlens.dev/v1/describe";

/// Client for the frame-analysis service.
#[derive(Clone)]
pub struct FrameAnalyzer {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl FrameAnalyzer {
    /// Creates an analyzer from the analysis secret.
    pub fn new(secret: &AnalysisSecret) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| QlensError::internal(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            endpoint: secret
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key: secret.api_key.clone(),
        })
    }

    /// Describes a captured frame.
    ///
    /// The prompt names the overlay mode and the weight active at capture so
    /// the description can reference them; the frame travels base64-encoded.
    pub async fn describe_frame(
        &self,
        frame: &[u8],
        mode: OverlayMode,
        weight: f64,
    ) -> Result<String> {
        let request = DescribeRequest {
            prompt: build_prompt(mode, weight),
            image: BASE64_STANDARD.encode(frame),
            mime_type: "image/png".to_string(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                QlensError::link_unreachable(format!("analysis request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(QlensError::internal(format!(
                "analysis returned {status}: {}",
                body.chars().take(160).collect::<String>()
            )));
        }

        let parsed: DescribeResponse = response.json().await.map_err(|err| {
            QlensError::internal(format!("malformed analysis response: {err}"))
        })?;

        Ok(parsed.text)
    }
}

fn build_prompt(mode: OverlayMode, weight: f64) -> String {
    format!(
        "Describe this frame, captured through the {mode} overlay with a quantum weight of {weight:.4}. Keep it to two sentences."
    )
}

#[derive(Serialize)]
struct DescribeRequest {
    prompt: String,
    image: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

#[derive(Deserialize)]
struct DescribeResponse {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_mode_and_weight() {
        let prompt = build_prompt(OverlayMode::Noir, 0.4493);
        assert!(prompt.contains("noir"));
        assert!(prompt.contains("0.4493"));
    }

    #[test]
    fn test_endpoint_defaults_when_unset() {
        let analyzer = FrameAnalyzer::new(&AnalysisSecret {
            api_key: "key".to_string(),
            endpoint: None,
        })
        .unwrap();
        assert_eq!(analyzer.endpoint, DEFAULT_ENDPOINT);
    }
}
