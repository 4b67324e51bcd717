//! Error taxonomy shared across the pipeline
//!
//! Classification is by kind, not by string matching, with one deliberate
//! exception: the retry layer inspects the rendered message of a
//! [`GenerationError`] for the transient-service vocabulary ("503",
//! "overloaded", "UNAVAILABLE"), so implementations of the generation
//! boundary must surface upstream error text verbatim.

use thiserror::Error;

/// Errors from the external text-generation service boundary.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The service reported itself unavailable or overloaded; retryable.
    #[error("generation service unavailable: {0}")]
    Unavailable(String),
    /// Transport-level failure; fatal unless its text carries the
    /// transient vocabulary.
    #[error("generation transport error: {0}")]
    Http(String),
    /// The service answered but the payload was not usable.
    #[error("invalid generation response: {0}")]
    InvalidResponse(String),
    /// Anything else.
    #[error("generation error: {0}")]
    Other(String),
}

/// Errors an extraction engine can surface past the per-message boundary.
///
/// Note what is *not* here: a heuristic miss is `Ok(None)`, never an error,
/// and a malformed model response is dropped inside the engine (logged, not
/// retried) rather than raised.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The generation call failed after the retry layer gave up (or failed
    /// fatally on first attempt).
    #[error("{0}")]
    Generation(#[from] GenerationError),
    /// Unparsable model output. Engines normally swallow this per message;
    /// the variant exists for callers that parse responses directly.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

/// Errors from the chat-source collaborator.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Underlying I/O failure
    #[error("source io error: {0}")]
    Io(#[from] std::io::Error),
    /// The payload could not be decoded into messages
    #[error("source decode error: {0}")]
    Decode(String),
    /// The requested channel does not exist
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_preserves_upstream_text() {
        let err = GenerationError::Unavailable("HTTP 503: overloaded".to_string());
        let rendered = err.to_string();
        assert!(rendered.contains("503"));
        assert!(rendered.contains("overloaded"));
    }

    #[test]
    fn test_extract_error_wraps_generation() {
        let err: ExtractError = GenerationError::Other("boom".to_string()).into();
        assert!(matches!(err, ExtractError::Generation(_)));
        assert!(err.to_string().contains("boom"));
    }
}
