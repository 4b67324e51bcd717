//! Token-bucket rate limiter shaping calls to the generation service

use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Milliseconds over which one full capacity regenerates.
const REFILL_WINDOW_MS: f64 = 60_000.0;

/// A token bucket with `capacity` tokens per minute.
///
/// Constructed once and passed by reference to every caller; the pipeline is
/// single-task sequential, so no mutual exclusion is provided or needed.
/// Uses tokio's clock, so tests can drive it deterministically with
/// `tokio::time::pause`.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    available: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// A bucket holding up to `capacity` tokens, regenerating fully over a
    /// minute. Starts empty: tokens accrue from construction time, so the
    /// first window is subject to the same budget as every later one.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity: capacity as f64,
            available: 0.0,
            last_refill: Instant::now(),
        }
    }

    /// Tokens currently available (after a refill at the current instant).
    pub fn available(&mut self) -> f64 {
        self.refill();
        self.available
    }

    fn refill(&mut self) {
        let elapsed_ms = self.last_refill.elapsed().as_millis() as f64;
        self.available =
            (self.available + elapsed_ms * self.capacity / REFILL_WINDOW_MS).min(self.capacity);
        self.last_refill = Instant::now();
    }

    /// Take `tokens` from the bucket, waiting exactly as long as the
    /// shortfall takes to regenerate when the bucket is low.
    ///
    /// `available` may reach exactly zero but never goes negative.
    pub async fn consume(&mut self, tokens: u32) {
        let requested = tokens as f64;
        self.refill();

        if requested > self.available {
            let shortfall = requested - self.available;
            let wait_ms = (shortfall * REFILL_WINDOW_MS / self.capacity).ceil() as u64;
            debug!(wait_ms, shortfall, "rate limit reached, waiting for refill");
            tokio::time::sleep(Duration::from_millis(wait_ms)).await;
            self.refill();
        }

        self.available = (self.available - requested).max(0.0);
    }
}
