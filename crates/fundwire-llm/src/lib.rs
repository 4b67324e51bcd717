//! Fundwire Generation-Service Layer
//!
//! Implementations of the [`GenerationService`] trait from `fundwire-domain`.
//!
//! # Providers
//!
//! - [`MockGenerator`]: deterministic mock for testing
//! - [`OllamaGenerator`]: local Ollama API integration
//!
//! Neither provider retries on its own. Backoff and transient-error
//! classification are owned by the retry controller in `fundwire-batch`, so
//! providers surface upstream error text verbatim and return immediately.

#![warn(missing_docs)]

pub mod ollama;

use async_trait::async_trait;
use fundwire_domain::{GenerationError, GenerationService};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub use ollama::OllamaGenerator;

/// One canned reply a [`MockGenerator`] can hold.
#[derive(Debug, Clone)]
enum CannedReply {
    /// Successful completion text
    Text(String),
    /// Retryable failure; the text is surfaced inside the error
    Unavailable(String),
    /// Non-retryable failure
    Fatal(String),
}

impl CannedReply {
    fn into_result(self) -> Result<String, GenerationError> {
        match self {
            CannedReply::Text(text) => Ok(text),
            CannedReply::Unavailable(msg) => Err(GenerationError::Unavailable(msg)),
            CannedReply::Fatal(msg) => Err(GenerationError::Other(msg)),
        }
    }
}

/// Mock generation service for deterministic testing.
///
/// Returns pre-configured responses without any network calls. Replies can be
/// keyed by prompt, queued in sequence (consumed first, regardless of
/// prompt), or fall through to a fixed default.
///
/// # Examples
///
/// ```
/// use fundwire_llm::MockGenerator;
/// use fundwire_domain::GenerationService;
///
/// # tokio_test::block_on(async {
/// let generator = MockGenerator::new(r#"{"company": "Acme"}"#);
/// let reply = generator.generate("any prompt").await.unwrap();
/// assert!(reply.contains("Acme"));
/// assert_eq!(generator.call_count(), 1);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockGenerator {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    queue: Arc<Mutex<VecDeque<CannedReply>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockGenerator {
    /// Create a mock that answers every prompt with `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Register a specific response for a given prompt.
    pub fn add_response(&self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), response.into());
    }

    /// Queue a successful reply consumed by the next call, any prompt.
    pub fn push_text(&self, response: impl Into<String>) {
        self.queue
            .lock()
            .unwrap()
            .push_back(CannedReply::Text(response.into()));
    }

    /// Queue a retryable `Unavailable` failure for the next call.
    pub fn push_unavailable(&self, message: impl Into<String>) {
        self.queue
            .lock()
            .unwrap()
            .push_back(CannedReply::Unavailable(message.into()));
    }

    /// Queue a fatal failure for the next call.
    pub fn push_fatal(&self, message: impl Into<String>) {
        self.queue
            .lock()
            .unwrap()
            .push_back(CannedReply::Fatal(message.into()));
    }

    /// Number of times `generate` was called.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call counter.
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new("{}")
    }
}

#[async_trait]
impl GenerationService for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        *self.call_count.lock().unwrap() += 1;

        if let Some(reply) = self.queue.lock().unwrap().pop_front() {
            return reply.into_result();
        }

        let responses = self.responses.lock().unwrap();
        if let Some(response) = responses.get(prompt) {
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_response() {
        let generator = MockGenerator::new("fixed");
        assert_eq!(generator.generate("anything").await.unwrap(), "fixed");
    }

    #[tokio::test]
    async fn test_prompt_keyed_responses() {
        let generator = MockGenerator::default();
        generator.add_response("hello", "world");
        assert_eq!(generator.generate("hello").await.unwrap(), "world");
        assert_eq!(generator.generate("other").await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_queued_replies_consumed_in_order() {
        let generator = MockGenerator::new("default");
        generator.push_unavailable("HTTP 503: overloaded");
        generator.push_text("after recovery");

        let err = generator.generate("p").await.unwrap_err();
        assert!(err.to_string().contains("503"));
        assert_eq!(generator.generate("p").await.unwrap(), "after recovery");
        // Queue drained, back to default
        assert_eq!(generator.generate("p").await.unwrap(), "default");
    }

    #[tokio::test]
    async fn test_fatal_reply() {
        let generator = MockGenerator::default();
        generator.push_fatal("bad request");
        let err = generator.generate("p").await.unwrap_err();
        assert!(matches!(err, GenerationError::Other(_)));
    }

    #[tokio::test]
    async fn test_call_count_shared_across_clones() {
        let generator = MockGenerator::new("x");
        let clone = generator.clone();
        generator.generate("a").await.unwrap();
        clone.generate("b").await.unwrap();
        assert_eq!(generator.call_count(), 2);
        generator.reset_call_count();
        assert_eq!(clone.call_count(), 0);
    }
}
