//! Error types for the batch layer

use fundwire_domain::SourceError;
use fundwire_store::StoreError;
use thiserror::Error;

/// Errors that terminate a batch run.
///
/// Deliberately narrow: extraction failures are handled inside the run
/// (skipped messages, retried and then logged batches) and never appear
/// here. Only source and persistence failures may end a run.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The chat-source collaborator failed
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    /// A durable write or read failed; the run must stop rather than
    /// continue with an unverified checkpoint
    #[error("persistence error: {0}")]
    Store(#[from] StoreError),
}
