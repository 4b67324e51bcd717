//! Configuration for batch runs

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for the batch orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Messages per batch
    pub batch_size: usize,
    /// Retries per batch before it is logged as failed
    pub batch_retries: u32,
    /// Inter-batch delay at the start of a run (milliseconds)
    pub initial_delay_ms: u64,
    /// Floor the inter-batch delay decays toward (milliseconds)
    pub min_delay_ms: u64,
    /// Ceiling the inter-batch delay grows toward (milliseconds)
    pub max_delay_ms: u64,
    /// Geometric factor applied on batch failure (grow) and success (decay)
    pub backoff_factor: f64,
    /// Pacing delay between messages within a batch (milliseconds)
    pub message_delay_ms: u64,
    /// Token-bucket capacity: generation calls per minute
    pub rate_capacity: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            batch_retries: 3,
            initial_delay_ms: 2_000,
            min_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_factor: 1.5,
            message_delay_ms: 100,
            rate_capacity: 30,
        }
    }
}

impl BatchConfig {
    /// Preset for unattended bulk runs: big batches, patient pacing.
    pub fn bulk() -> Self {
        Self {
            batch_size: 200,
            ..Self::default()
        }
    }

    /// Preset for interactive runs: small batches, fast feedback.
    pub fn interactive() -> Self {
        Self {
            batch_size: 10,
            initial_delay_ms: 500,
            message_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Inter-batch delay at the start of a run.
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Pacing delay between messages.
    pub fn message_delay(&self) -> Duration {
        Duration::from_millis(self.message_delay_ms)
    }

    /// Grow a delay after a failure: `min(delay * factor, max)`.
    pub fn grow_delay(&self, delay: Duration) -> Duration {
        let next = (delay.as_millis() as f64 * self.backoff_factor) as u64;
        Duration::from_millis(next.min(self.max_delay_ms))
    }

    /// Decay a delay after a success: `max(delay / factor, min)`.
    pub fn decay_delay(&self, delay: Duration) -> Duration {
        let next = (delay.as_millis() as f64 / self.backoff_factor) as u64;
        Duration::from_millis(next.max(self.min_delay_ms))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be greater than 0".to_string());
        }
        if self.backoff_factor <= 1.0 {
            return Err("backoff_factor must be greater than 1.0".to_string());
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err("min_delay_ms cannot exceed max_delay_ms".to_string());
        }
        if self.rate_capacity == 0 {
            return Err("rate_capacity must be greater than 0".to_string());
        }
        Ok(())
    }
}
