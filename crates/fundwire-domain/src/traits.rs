//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and its
//! collaborators. Implementations live in the infrastructure crates
//! (fundwire-llm, fundwire-store, fundwire-extractor, fundwire-cli).

use crate::errors::{ExtractError, GenerationError, SourceError};
use crate::message::{MessageEntities, RawMessage};
use crate::record::InvestmentRecord;
use async_trait::async_trait;

/// The chat-source collaborator: yields raw messages for a channel.
#[async_trait]
pub trait MessageSource {
    /// Fetch up to `limit` messages for `channel`, oldest first.
    async fn fetch(&self, channel: &str, limit: usize) -> Result<Vec<RawMessage>, SourceError>;
}

/// The keyword/entity collaborator: tags message text before extraction.
pub trait TextAnalyzer {
    /// Analyze one message text into its entity bundle.
    fn analyze(&self, text: &str) -> MessageEntities;
}

/// The text-generation service boundary.
///
/// Production uses an in-process HTTP transport; tests use a mock. Callers
/// never retry here themselves - backoff is owned by the retry controller in
/// fundwire-batch.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// One extraction strategy: a message in, zero or one canonical record out.
///
/// Implemented by both the deterministic engine and the AI engine so the
/// batch orchestrator can drive either interchangeably. `&mut self` because
/// the AI engine owns mutable rate-limiter state.
#[async_trait]
pub trait ExtractionEngine {
    /// Parse one message. `Ok(None)` is a heuristic miss, not an error.
    async fn parse(
        &mut self,
        message: &RawMessage,
    ) -> Result<Option<InvestmentRecord>, ExtractError>;
}
