//! The model-backed extraction engine.
//!
//! Wraps a [`GenerationService`] with the rate limiter and retry
//! controller, prompts per message shape, and funnels responses through
//! the tolerant parser. Unusable model output is logged and dropped;
//! only exhausted retries and fatal transport errors surface.

use async_trait::async_trait;
use tracing::{debug, warn};

use fundwire_batch::rate::TokenBucket;
use fundwire_batch::retry::{run_with_retry, RetryPolicy};
use fundwire_domain::{
    ExtractError, ExtractionEngine, GenerationService, InvestmentRecord, RawMessage,
};

use crate::heuristic::{has_funding_vocabulary, RoundupDetector};
use crate::{parser, prompt};

/// Tokens one generation request costs against the per-minute budget.
const TOKENS_PER_REQUEST: u32 = 1;

/// Extraction engine backed by a text-generation service.
pub struct AiEngine<G> {
    service: G,
    retry: RetryPolicy,
    bucket: TokenBucket,
    detector: RoundupDetector,
}

impl<G: GenerationService> AiEngine<G> {
    /// Builds an engine around `service` with the given retry policy and
    /// a request budget of `requests_per_minute`.
    pub fn new(
        service: G,
        retry: RetryPolicy,
        requests_per_minute: u32,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            service,
            retry,
            bucket: TokenBucket::new(requests_per_minute),
            detector: RoundupDetector::new()?,
        })
    }

    /// Extracts zero or one record from a message via the model.
    ///
    /// `Ok(None)` covers both pre-filter misses and responses that could
    /// not be decoded; `Err` means the generation call itself failed for
    /// good.
    pub async fn extract(
        &mut self,
        message: &RawMessage,
    ) -> Result<Option<InvestmentRecord>, ExtractError> {
        let text = message.text.trim();
        if text.is_empty() || !has_funding_vocabulary(text) {
            return Ok(None);
        }
        let roundup = self.detector.is_roundup(text);
        let prompt = if roundup {
            prompt::roundup_prompt(text)
        } else {
            prompt::single_prompt(text)
        };

        self.bucket.consume(TOKENS_PER_REQUEST).await;
        let service = &self.service;
        let response = run_with_retry(&self.retry, || service.generate(&prompt)).await?;

        let Some(object) = parser::isolate_object(&response) else {
            warn!(message = message.id, "no JSON object in model response");
            return Ok(None);
        };
        let value: serde_json::Value = match serde_json::from_str(object) {
            Ok(value) => value,
            Err(err) => {
                warn!(message = message.id, error = %err, "model response is not valid JSON");
                return Ok(None);
            }
        };
        let record = parser::normalize_response(&value, message, roundup);
        match record {
            Some(record) if record.has_empty_company() => {
                debug!(message = message.id, "record discarded, empty company");
                Ok(None)
            }
            Some(record) => Ok(Some(record)),
            None => {
                debug!(message = message.id, "model response had no usable record");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl<G: GenerationService> ExtractionEngine for AiEngine<G> {
    async fn parse(
        &mut self,
        message: &RawMessage,
    ) -> Result<Option<InvestmentRecord>, ExtractError> {
        self.extract(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundwire_llm::MockGenerator;

    fn msg(text: &str) -> RawMessage {
        RawMessage::new(11, "2024-06-01T12:00:00Z", text)
    }

    fn engine(mock: MockGenerator) -> AiEngine<MockGenerator> {
        AiEngine::new(mock, RetryPolicy::no_retries(), 600).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn chatty_response_still_parses() {
        let mock = MockGenerator::new(
            "Sure, here you go: {\"type\":\"investment\",\"company\":\"Foo\",\"amount\":\"$2M\"} hope that helps",
        );
        let record = engine(mock.clone())
            .extract(&msg("Foo raised $2M"))
            .await
            .unwrap()
            .unwrap();
        let InvestmentRecord::Single(single) = record else {
            panic!("expected single record");
        };
        assert_eq!(single.company, "Foo");
        assert_eq!(single.amount, "2M");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unbalanced_response_is_dropped_not_raised() {
        let mock = MockGenerator::new("I could not find any JSON for you");
        let result = engine(mock).extract(&msg("Foo raised $2M")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_json_is_dropped_not_raised() {
        let mock = MockGenerator::new("{not json at all}");
        let result = engine(mock).extract(&msg("Foo raised $2M")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn prefilter_skips_without_calling_service() {
        let mock = MockGenerator::new("{}");
        let result = engine(mock.clone())
            .extract(&msg("gm, nice weather"))
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_retry_then_succeed() {
        let mock = MockGenerator::new("{\"type\":\"investment\",\"company\":\"Foo\",\"amount\":\"1M\"}");
        mock.push_unavailable("HTTP 503: overloaded");
        mock.push_unavailable("HTTP 503: overloaded");
        let mut engine =
            AiEngine::new(mock.clone(), RetryPolicy::default(), 600).unwrap();
        let record = engine.extract(&msg("Foo raised $1M")).await.unwrap();
        assert!(record.is_some());
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_surfaces_after_no_retries() {
        let mock = MockGenerator::new("{}");
        let err_text = "model not available";
        mock.push_fatal(err_text);
        let err = engine(mock.clone())
            .extract(&msg("Foo raised $1M"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains(err_text));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn roundup_message_gets_roundup_record() {
        let mock = MockGenerator::new(
            "{\"type\":\"roundup\",\"companies\":[\"Acme\",\"Beta\"],\"amounts\":[\"10M\",\"2.5M\"]}",
        );
        let record = engine(mock)
            .extract(&msg("Top 5 Rounds of This Week: Acme - $10M, Beta - $2.5M"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.record_type(), "roundup");
        assert_eq!(record.companies(), vec!["Acme", "Beta"]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_company_response_discarded() {
        let mock = MockGenerator::new("{\"type\":\"investment\",\"company\":\"  \",\"amount\":\"1M\"}");
        let result = engine(mock).extract(&msg("Someone raised $1M")).await.unwrap();
        assert!(result.is_none());
    }
}
