//! End-to-end tests of the batch orchestrator over stub collaborators.

use async_trait::async_trait;
use fundwire_batch::{BatchConfig, BatchOrchestrator};
use fundwire_domain::{
    EventKind, ExtractError, ExtractionEngine, GenerationError, InvestmentRecord, MessageSource,
    RawMessage, RecordCommon, SingleRecord, SourceError, TextAnalyzer,
};
use fundwire_store::FileStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

struct VecSource(Vec<RawMessage>);

#[async_trait]
impl MessageSource for VecSource {
    async fn fetch(&self, _channel: &str, limit: usize) -> Result<Vec<RawMessage>, SourceError> {
        Ok(self.0.iter().take(limit).cloned().collect())
    }
}

/// Engine stub: yields one record per message, a miss for texts containing
/// "miss", and a transient failure for texts containing "flaky".
struct ScriptedEngine {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ExtractionEngine for ScriptedEngine {
    async fn parse(
        &mut self,
        message: &RawMessage,
    ) -> Result<Option<InvestmentRecord>, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if message.text.contains("flaky") {
            return Err(GenerationError::Unavailable("HTTP 503: overloaded".into()).into());
        }
        if message.text.contains("miss") {
            return Ok(None);
        }
        Ok(Some(InvestmentRecord::Single(SingleRecord {
            event: EventKind::Investment,
            company: format!("Company {}", message.id),
            amount: "1M".to_string(),
            acquirer: None,
            common: RecordCommon {
                date: message.date.clone(),
                raw_text: message.text.clone(),
                ..Default::default()
            },
        })))
    }
}

fn messages(texts: &[&str]) -> Vec<RawMessage> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| RawMessage::new(i as i64, "2024-05-01T00:00:00Z", *text))
        .collect()
}

fn fast_config() -> BatchConfig {
    BatchConfig {
        batch_size: 2,
        batch_retries: 1,
        initial_delay_ms: 10,
        min_delay_ms: 1,
        max_delay_ms: 100,
        message_delay_ms: 0,
        ..BatchConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn run_processes_all_batches_and_merges() {
    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let source = VecSource(messages(&["a", "b", "miss", "d", "e"]));
    let engine = ScriptedEngine {
        calls: calls.clone(),
    };
    let mut orchestrator = BatchOrchestrator::new(source, engine, store.clone(), fast_config());

    let report = orchestrator.run("alpha", 100).await.unwrap();
    assert_eq!(report.total_messages, 5);
    assert_eq!(report.batches, 3);
    assert_eq!(report.failed_batches, 0);
    assert_eq!(report.records, 4); // one heuristic miss
    assert_eq!(calls.load(Ordering::SeqCst), 5);

    let merged = store.merge_batches("alpha").unwrap();
    assert_eq!(merged.len(), 4);
    let checkpoint = store.read_checkpoint("alpha").unwrap().unwrap();
    assert_eq!(checkpoint.next_batch_index(), 3);
    assert_eq!(checkpoint.total_processed, 5);
    assert!(dir.path().join("investments_alpha.json").exists());
    assert!(dir.path().join("summary_alpha.json").exists());
    assert!(dir.path().join("raw_alpha.json").exists());
}

#[tokio::test(start_paused = true)]
async fn failed_batch_is_logged_and_never_blocks_later_batches() {
    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    // Batch 1 ("flaky", "d") keeps failing transiently; batches 0 and 2 are fine.
    let source = VecSource(messages(&["a", "b", "flaky", "d", "e", "f"]));
    let engine = ScriptedEngine {
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let mut orchestrator = BatchOrchestrator::new(source, engine, store.clone(), fast_config());

    let report = orchestrator.run("alpha", 100).await.unwrap();
    assert_eq!(report.batches, 3);
    assert_eq!(report.failed_batches, 1);
    assert_eq!(report.records, 4);

    let checkpoint = store.read_checkpoint("alpha").unwrap().unwrap();
    assert_eq!(checkpoint.errors.len(), 1);
    assert_eq!(checkpoint.errors[0].batch, 1);
    assert!(checkpoint.errors[0].message.contains("503"));
    // The failed batch still persisted an (empty) output file
    assert_eq!(store.read_batch("alpha", 1).unwrap().unwrap().len(), 0);
    // And the run moved past it
    assert_eq!(checkpoint.next_batch_index(), 3);
}

#[tokio::test(start_paused = true)]
async fn resumed_run_skips_completed_batches() {
    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let texts = ["a", "b", "c", "d"];

    let first_calls = Arc::new(AtomicUsize::new(0));
    let mut first = BatchOrchestrator::new(
        VecSource(messages(&texts)),
        ScriptedEngine {
            calls: first_calls.clone(),
        },
        store.clone(),
        fast_config(),
    );
    first.run("alpha", 100).await.unwrap();
    assert_eq!(first_calls.load(Ordering::SeqCst), 4);

    // Same channel, fresh process: everything is already checkpointed.
    let second_calls = Arc::new(AtomicUsize::new(0));
    let mut second = BatchOrchestrator::new(
        VecSource(messages(&texts)),
        ScriptedEngine {
            calls: second_calls.clone(),
        },
        store.clone(),
        fast_config(),
    );
    let report = second.run("alpha", 100).await.unwrap();
    assert_eq!(report.skipped_batches, 2);
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    assert_eq!(report.records, 4);
}

#[tokio::test(start_paused = true)]
async fn analyzer_fills_missing_entity_bundles() {
    struct KeywordStub;
    impl TextAnalyzer for KeywordStub {
        fn analyze(&self, _text: &str) -> fundwire_domain::MessageEntities {
            fundwire_domain::MessageEntities {
                keywords: vec!["funding".to_string()],
                ..Default::default()
            }
        }
    }

    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let mut orchestrator = BatchOrchestrator::new(
        VecSource(messages(&["a"])),
        ScriptedEngine {
            calls: Arc::new(AtomicUsize::new(0)),
        },
        store.clone(),
        fast_config(),
    )
    .with_analyzer(Box::new(KeywordStub));

    orchestrator.run("alpha", 100).await.unwrap();

    let raw = std::fs::read_to_string(dir.path().join("summary_alpha.json")).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(summary["topKeywords"][0], "funding");
}
