//! Fundwire Persistence Layer
//!
//! Durable JSON files under one output directory: the raw-message dump, one
//! output file per completed batch, the per-channel checkpoint, and the
//! aggregated summaries. Writes are synchronous full rewrites; a write
//! failure is a persistence error the run must not survive, because an
//! unverified checkpoint would make resume positions untrustworthy.

#![warn(missing_docs)]

use fundwire_domain::{CheckpointState, InvestmentRecord, RawMessage};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors from the durable store.
///
/// These are the PersistenceError class of the pipeline taxonomy: callers
/// propagate them immediately and fail the run rather than proceed with an
/// unverified checkpoint.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem failure
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    /// Payload could not be encoded or decoded
    #[error("store codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// File-backed store rooted at one output directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The output directory this store writes under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn write_file<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let payload = serde_json::to_string_pretty(value)?;
        fs::write(self.path(name), payload)?;
        debug!(file = name, "persisted");
        Ok(())
    }

    fn read_file<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StoreError> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Persist the raw messages fetched for `channel`.
    pub fn write_raw_messages(
        &self,
        channel: &str,
        messages: &[RawMessage],
    ) -> Result<(), StoreError> {
        self.write_file(&format!("raw_{channel}.json"), &messages)
    }

    /// Persist one batch's extracted records. An exhausted-failure batch
    /// writes an empty list so the merge pass sees every index.
    pub fn write_batch(
        &self,
        channel: &str,
        index: i64,
        records: &[InvestmentRecord],
    ) -> Result<(), StoreError> {
        self.write_file(&format!("batch_{channel}_{index}.json"), &records)
    }

    /// Read back one batch's records, if that batch was ever persisted.
    pub fn read_batch(
        &self,
        channel: &str,
        index: i64,
    ) -> Result<Option<Vec<InvestmentRecord>>, StoreError> {
        self.read_file(&format!("batch_{channel}_{index}.json"))
    }

    /// Concatenate every persisted batch for `channel` in batch order.
    pub fn merge_batches(&self, channel: &str) -> Result<Vec<InvestmentRecord>, StoreError> {
        let prefix = format!("batch_{channel}_");
        let mut indexed: Vec<(i64, PathBuf)> = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(rest) = name.strip_prefix(&prefix) {
                if let Some(stem) = rest.strip_suffix(".json") {
                    if let Ok(index) = stem.parse::<i64>() {
                        indexed.push((index, entry.path()));
                    }
                }
            }
        }
        indexed.sort_by_key(|(index, _)| *index);

        let mut merged = Vec::new();
        for (_, path) in indexed {
            let contents = fs::read_to_string(path)?;
            let records: Vec<InvestmentRecord> = serde_json::from_str(&contents)?;
            merged.extend(records);
        }
        Ok(merged)
    }

    /// Rewrite the full checkpoint state for its channel.
    pub fn write_checkpoint(&self, state: &CheckpointState) -> Result<(), StoreError> {
        self.write_file(&format!("checkpoint_{}.json", state.channel), state)
    }

    /// Load the checkpoint for `channel`, if one was ever persisted.
    pub fn read_checkpoint(&self, channel: &str) -> Result<Option<CheckpointState>, StoreError> {
        self.read_file(&format!("checkpoint_{channel}.json"))
    }

    /// Remove the checkpoint for `channel`, if present.
    pub fn delete_checkpoint(&self, channel: &str) -> Result<(), StoreError> {
        let path = self.path(&format!("checkpoint_{channel}.json"));
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Persist an arbitrary summary document (channel summary, investment
    /// summary) under `name`.
    pub fn write_summary<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        self.write_file(name, value)
    }
}
