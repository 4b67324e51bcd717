//! Fundwire Batch Layer
//!
//! The reliability machinery that lets extraction run unattended against a
//! rate-limited, occasionally-unavailable generation service:
//!
//! - [`RetryPolicy`] / [`run_with_retry`]: exponential backoff with jitter
//!   and retryable-vs-fatal classification
//! - [`TokenBucket`]: outbound call shaping
//! - [`CheckpointManager`]: crash-safe per-channel resume state
//! - [`BatchOrchestrator`]: the sequential top-level driver
//!
//! Everything here is single-task cooperative: no two extraction calls are
//! ever in flight at once, which keeps the token bucket and retry state free
//! of cross-call races.

#![warn(missing_docs)]

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod rate;
pub mod retry;

pub use checkpoint::CheckpointManager;
pub use config::BatchConfig;
pub use error::BatchError;
pub use orchestrator::{BatchOrchestrator, RunReport};
pub use rate::TokenBucket;
pub use retry::{is_retryable, run_with_retry, RetryPolicy};
