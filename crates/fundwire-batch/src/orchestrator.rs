//! Batch orchestrator: the sequential top-level driver of a run
//!
//! Splits a channel's messages into bounded batches, drives the configured
//! extraction engine over every message, adapts the inter-batch delay to
//! observed failures, persists per-batch output independently, and merges
//! everything into the aggregated summary at the end. Strictly sequential:
//! messages within a batch in order, batches in order, at most one
//! generation call ever in flight.

use crate::checkpoint::CheckpointManager;
use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::retry::is_retryable;
use fundwire_domain::{
    ExtractError, ExtractionEngine, InvestmentRecord, MessageSource, RawMessage, TextAnalyzer,
};
use fundwire_store::FileStore;
use tracing::{error, info, warn};

/// Outcome of one full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Messages fetched from the source
    pub total_messages: usize,
    /// Batches the message set was partitioned into
    pub batches: usize,
    /// Batches skipped because a previous run already completed them
    pub skipped_batches: usize,
    /// Batches logged as failed after exhausting retries
    pub failed_batches: usize,
    /// Records in the merged output
    pub records: usize,
}

/// Drives one extraction engine over one channel, reliably.
pub struct BatchOrchestrator<S, E> {
    source: S,
    engine: E,
    store: FileStore,
    analyzer: Option<Box<dyn TextAnalyzer + Send>>,
    config: BatchConfig,
}

impl<S, E> BatchOrchestrator<S, E>
where
    S: MessageSource,
    E: ExtractionEngine,
{
    /// Create an orchestrator over `source` and `engine`, persisting under
    /// `store`.
    pub fn new(source: S, engine: E, store: FileStore, config: BatchConfig) -> Self {
        Self {
            source,
            engine,
            store,
            analyzer: None,
            config,
        }
    }

    /// Attach the keyword/entity collaborator; messages without an entity
    /// bundle get one before extraction.
    pub fn with_analyzer(mut self, analyzer: Box<dyn TextAnalyzer + Send>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Run the pipeline over up to `limit` messages of `channel`.
    ///
    /// Only source and persistence failures abort the run; extraction
    /// failures are retried, then logged to the checkpoint, and the run
    /// moves on with whatever partial results exist.
    pub async fn run(&mut self, channel: &str, limit: usize) -> Result<RunReport, BatchError> {
        let mut messages = self.source.fetch(channel, limit).await?;
        messages.truncate(limit);

        if let Some(analyzer) = &self.analyzer {
            for message in &mut messages {
                if message.entities.is_none() {
                    message.entities = Some(analyzer.analyze(&message.text));
                }
            }
        }

        self.store.write_raw_messages(channel, &messages)?;
        let channel_summary = fundwire_report::summarize_channel(&messages);
        self.store
            .write_summary(&format!("summary_{channel}.json"), &channel_summary)?;

        let mut checkpoint =
            CheckpointManager::open(self.store.clone(), channel, self.config.batch_size)?;
        // Resume must partition exactly as the checkpointed run did.
        let batch_size = checkpoint.state().batch_size.max(1);
        let resume_from = checkpoint.next_batch_index();

        let batches: Vec<&[RawMessage]> = messages.chunks(batch_size).collect();
        info!(
            channel,
            messages = messages.len(),
            batches = batches.len(),
            resume_from,
            "starting batch run"
        );

        let mut delay = self.config.initial_delay();
        let mut failed_batches = 0usize;
        let mut skipped_batches = 0usize;

        for (index, batch) in batches.iter().enumerate() {
            let index = index as i64;
            if index < resume_from {
                skipped_batches += 1;
                continue;
            }

            let mut attempt: u32 = 0;
            let outcome = loop {
                match self.process_batch(batch).await {
                    Ok(records) => break Ok(records),
                    Err(err) => {
                        attempt += 1;
                        delay = self.config.grow_delay(delay);
                        if attempt > self.config.batch_retries {
                            break Err(err);
                        }
                        warn!(
                            batch = index,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "batch failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            };

            // Persist the batch output first, then advance the checkpoint:
            // a crash in between reprocesses one batch, never loses one.
            match outcome {
                Ok(records) => {
                    self.store.write_batch(channel, index, &records)?;
                    checkpoint.record_success(index, batch.len() as u64)?;
                    delay = self.config.decay_delay(delay);
                    info!(batch = index, records = records.len(), "batch complete");
                }
                Err(err) => {
                    failed_batches += 1;
                    self.store.write_batch(channel, index, &[])?;
                    checkpoint.record_error(index, &err.to_string())?;
                    error!(batch = index, error = %err, "batch failed after retries, moving on");
                }
            }

            tokio::time::sleep(delay).await;
        }

        let merged = self.store.merge_batches(channel)?;
        let summary = fundwire_report::summarize(&merged, true);
        self.store
            .write_summary(&format!("investments_{channel}.json"), &summary)?;
        info!(
            channel,
            records = merged.len(),
            failed_batches,
            "run complete"
        );

        Ok(RunReport {
            total_messages: messages.len(),
            batches: batches.len(),
            skipped_batches,
            failed_batches,
            records: merged.len(),
        })
    }

    /// Process one batch strictly in message order.
    ///
    /// A transient-class engine error escalates to a batch failure (the
    /// caller retries the whole batch); any other engine error skips just
    /// that message.
    async fn process_batch(
        &mut self,
        batch: &[RawMessage],
    ) -> Result<Vec<InvestmentRecord>, ExtractError> {
        let mut records = Vec::new();
        for message in batch {
            match self.engine.parse(message).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(err) if is_retryable(&err.to_string()) => return Err(err),
                Err(err) => {
                    warn!(message = message.id, error = %err, "fatal extraction error, skipping message");
                }
            }
            if self.config.message_delay_ms > 0 {
                tokio::time::sleep(self.config.message_delay()).await;
            }
        }
        Ok(records)
    }
}
