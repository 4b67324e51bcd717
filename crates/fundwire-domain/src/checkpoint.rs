//! Durable per-channel progress state for resumable batch runs

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One logged batch failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointEntry {
    /// Index of the failed batch
    pub batch: i64,
    /// Error message as surfaced by the batch attempt
    pub message: String,
    /// RFC 3339 timestamp of when the failure was recorded
    pub time: String,
}

/// Per-channel progress record, the single source of truth for resume position.
///
/// `last_batch_index` and `total_processed` are monotonic non-decreasing;
/// `last_batch_index` starts at -1 meaning "nothing done". Every mutation is
/// flushed to durable storage before the next batch begins, so a crash
/// between batches leaves the last-completed state intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointState {
    /// Source channel key this state belongs to
    pub channel: String,
    /// Total messages processed across all completed batches
    pub total_processed: u64,
    /// Index of the last completed (or logged-failed) batch
    pub last_batch_index: i64,
    /// RFC 3339 timestamp of the last state change
    pub last_processed_time: String,
    /// Batch size the run was started with
    pub batch_size: usize,
    /// Ordered log of batch failures
    #[serde(default)]
    pub errors: Vec<CheckpointEntry>,
}

impl CheckpointState {
    /// Fresh state for a channel that has never been processed.
    pub fn new(channel: impl Into<String>, batch_size: usize) -> Self {
        Self {
            channel: channel.into(),
            total_processed: 0,
            last_batch_index: -1,
            last_processed_time: Utc::now().to_rfc3339(),
            batch_size,
            errors: Vec::new(),
        }
    }

    /// The next batch to run. Purely `last_batch_index + 1`; no other
    /// component may infer progress any other way.
    pub fn next_batch_index(&self) -> i64 {
        self.last_batch_index + 1
    }

    /// Mark `batch` complete with `count` messages processed.
    pub fn mark_success(&mut self, batch: i64, count: u64) {
        self.last_batch_index = self.last_batch_index.max(batch);
        self.total_processed += count;
        self.last_processed_time = Utc::now().to_rfc3339();
    }

    /// Log `batch` as failed and move past it.
    pub fn mark_error(&mut self, batch: i64, message: impl Into<String>) {
        self.errors.push(CheckpointEntry {
            batch,
            message: message.into(),
            time: Utc::now().to_rfc3339(),
        });
        self.last_batch_index = self.last_batch_index.max(batch);
        self.last_processed_time = Utc::now().to_rfc3339();
    }
}
