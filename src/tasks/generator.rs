use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::GeneratorConfig;

/// Failure talking to the image generation API. Callers treat every variant
/// as the same kind of error; the variants exist for logs and tests.
#[derive(Debug, Error)]
pub enum ApiResponseError {
    /// Transport failure or timeout.
    #[error("API request failed: {0}")]
    Request(String),
    #[error("API request failed with status code {0}")]
    Status(u16),
    /// 2xx status with a body we could not read as `{"output_url": ...}`.
    #[error("API response parsing failed: {0}")]
    Malformed(String),
}

impl ApiResponseError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, ApiResponseError::Malformed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedImage {
    pub output_url: String,
}

#[async_trait]
pub trait ImageGenerator: Send + Sync + 'static {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ApiResponseError>;
}

/// DeepAI-style generator: form field `text`, `api-key` header, JSON reply.
pub struct DeepAiGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl DeepAiGenerator {
    pub fn new(cfg: &GeneratorConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build generator http client")?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
        })
    }
}

#[async_trait]
impl ImageGenerator for DeepAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ApiResponseError> {
        debug!("generating image");
        let res = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .form(&[("text", prompt)])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "generator request failed");
                ApiResponseError::Request(e.to_string())
            })?;

        let status = res.status();
        if !status.is_success() {
            error!(%status, "generator returned error status");
            return Err(ApiResponseError::Status(status.as_u16()));
        }

        let body = res
            .text()
            .await
            .map_err(|e| ApiResponseError::Request(e.to_string()))?;
        let image = serde_json::from_str::<GeneratedImage>(&body).map_err(|e| {
            error!(error = %e, "generator response is not valid JSON");
            ApiResponseError::Malformed(e.to_string())
        })?;
        debug!(output_url = %image.output_url, "image generated");
        Ok(image)
    }
}
