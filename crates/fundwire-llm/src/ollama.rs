//! Ollama generation provider
//!
//! HTTP integration with Ollama's local generate API. This transport is
//! deliberately retry-free: a 503 or overload response is mapped onto
//! [`GenerationError::Unavailable`] with the upstream text preserved, and the
//! retry controller in `fundwire-batch` decides what happens next.

use async_trait::async_trait;
use fundwire_domain::{GenerationError, GenerationService};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for generation requests (120 seconds; extraction prompts
/// routinely take tens of seconds on local models)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Generation provider backed by a local Ollama instance.
pub struct OllamaGenerator {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

/// Request body for the Ollama generate API
#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Response from the Ollama generate API
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

impl OllamaGenerator {
    /// Create a new provider against `endpoint` using `model`.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| GenerationError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            client,
        })
    }

    /// Create a provider against the default local endpoint.
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, GenerationError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerationService for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        debug!(prompt_len = prompt.len(), model = %self.model, "sending generation request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Http(format!("request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            let parsed: GenerateResponse = response
                .json()
                .await
                .map_err(|e| GenerationError::InvalidResponse(format!("bad payload: {e}")))?;
            return Ok(parsed.response);
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());

        // 503 and 529 are the upstream "come back later" signals; keep the
        // status code in the message so the retry layer classifies it.
        if status.as_u16() == 503 || status.as_u16() == 529 {
            return Err(GenerationError::Unavailable(format!("HTTP {status}: {text}")));
        }
        if status.as_u16() == 404 {
            return Err(GenerationError::Other(format!(
                "model not available: {}",
                self.model
            )));
        }
        Err(GenerationError::Http(format!("HTTP {status}: {text}")))
    }
}
