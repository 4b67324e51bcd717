//! Checkpoint manager: durable, per-channel resume state

use crate::error::BatchError;
use fundwire_domain::CheckpointState;
use fundwire_store::FileStore;
use tracing::{debug, info};

/// Owns the checkpoint state for one channel and keeps it durable.
///
/// Every mutating call synchronously rewrites the full state to the store
/// before returning, so a crash between calls leaves the last-completed
/// state intact. Exactly one manager may run against a given channel at a
/// time; there is no locking.
pub struct CheckpointManager {
    state: CheckpointState,
    store: FileStore,
}

impl CheckpointManager {
    /// Load persisted state for `channel` if present, else initialize fresh
    /// state (persisting it immediately).
    ///
    /// On resume the persisted `batch_size` wins over `batch_size` passed
    /// here: batch boundaries must line up with the run that wrote the
    /// checkpoint or resume indexes would point into the wrong messages.
    pub fn open(store: FileStore, channel: &str, batch_size: usize) -> Result<Self, BatchError> {
        match store.read_checkpoint(channel)? {
            Some(state) => {
                info!(
                    channel,
                    last_batch = state.last_batch_index,
                    total = state.total_processed,
                    "resuming from persisted checkpoint"
                );
                Ok(Self { state, store })
            }
            None => {
                let state = CheckpointState::new(channel, batch_size);
                store.write_checkpoint(&state)?;
                debug!(channel, "initialized fresh checkpoint");
                Ok(Self { state, store })
            }
        }
    }

    /// The next batch to run: `last_batch_index + 1`.
    pub fn next_batch_index(&self) -> i64 {
        self.state.next_batch_index()
    }

    /// Current state, read-only.
    pub fn state(&self) -> &CheckpointState {
        &self.state
    }

    /// Record a completed batch and flush.
    pub fn record_success(&mut self, batch: i64, count: u64) -> Result<(), BatchError> {
        self.state.mark_success(batch, count);
        self.store.write_checkpoint(&self.state)?;
        Ok(())
    }

    /// Record an exhausted-failure batch and flush. The cursor still moves
    /// past the batch; a failed batch never blocks later batches or later
    /// runs.
    pub fn record_error(&mut self, batch: i64, message: &str) -> Result<(), BatchError> {
        self.state.mark_error(batch, message);
        self.store.write_checkpoint(&self.state)?;
        Ok(())
    }

    /// Discard all progress for this channel and flush the fresh state.
    pub fn reset(&mut self) -> Result<(), BatchError> {
        self.state = CheckpointState::new(self.state.channel.clone(), self.state.batch_size);
        self.store.write_checkpoint(&self.state)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fresh_checkpoint_persisted_on_open() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        let manager = CheckpointManager::open(store.clone(), "alpha", 25).unwrap();
        assert_eq!(manager.next_batch_index(), 0);

        // The initial state must already be durable
        let on_disk = store.read_checkpoint("alpha").unwrap().unwrap();
        assert_eq!(on_disk.last_batch_index, -1);
        assert_eq!(on_disk.batch_size, 25);
    }

    #[test]
    fn test_crash_resume_after_batch_k() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        let mut manager = CheckpointManager::open(store.clone(), "alpha", 10).unwrap();
        manager.record_success(0, 10).unwrap();
        manager.record_success(1, 10).unwrap();
        let total_after_k = manager.state().total_processed;
        drop(manager); // simulated crash before batch 2 starts

        let resumed = CheckpointManager::open(store, "alpha", 10).unwrap();
        assert_eq!(resumed.next_batch_index(), 2);
        assert_eq!(resumed.state().total_processed, total_after_k);
    }

    #[test]
    fn test_persisted_batch_size_wins_on_resume() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        let mut manager = CheckpointManager::open(store.clone(), "alpha", 10).unwrap();
        manager.record_success(0, 10).unwrap();
        drop(manager);

        let resumed = CheckpointManager::open(store, "alpha", 99).unwrap();
        assert_eq!(resumed.state().batch_size, 10);
    }

    #[test]
    fn test_error_entry_flushed() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        let mut manager = CheckpointManager::open(store.clone(), "alpha", 10).unwrap();
        manager.record_error(0, "HTTP 503: overloaded").unwrap();

        let on_disk = store.read_checkpoint("alpha").unwrap().unwrap();
        assert_eq!(on_disk.errors.len(), 1);
        assert_eq!(on_disk.errors[0].message, "HTTP 503: overloaded");
        assert_eq!(on_disk.next_batch_index(), 1);
    }

    #[test]
    fn test_reset_discards_progress() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        let mut manager = CheckpointManager::open(store.clone(), "alpha", 10).unwrap();
        manager.record_success(0, 10).unwrap();
        manager.reset().unwrap();

        assert_eq!(manager.next_batch_index(), 0);
        let on_disk = store.read_checkpoint("alpha").unwrap().unwrap();
        assert_eq!(on_disk.total_processed, 0);
    }
}
