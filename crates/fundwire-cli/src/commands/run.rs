//! The run command: the full batch pipeline over a channel export.

use crate::cli::{EngineKind, RunArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::source::JsonExportSource;

use fundwire_batch::{BatchConfig, BatchOrchestrator, RetryPolicy, RunReport};
use fundwire_domain::ExtractionEngine;
use fundwire_extractor::{AiEngine, HeuristicEngine};
use fundwire_llm::OllamaGenerator;
use fundwire_store::FileStore;

pub async fn execute_run(args: RunArgs, config: &Config) -> Result<()> {
    if !args.input.exists() {
        return Err(CliError::InvalidInput(format!(
            "input file not found: {}",
            args.input.display()
        )));
    }
    let output_dir = args.output.clone().unwrap_or_else(|| config.output_dir.clone());
    let store = FileStore::open(&output_dir)?;
    let source = JsonExportSource::new(&args.input);

    let mut batch = BatchConfig::default();
    batch.batch_size = config.batch_size;
    batch.rate_capacity = config.rate_capacity;
    batch
        .validate()
        .map_err(CliError::Config)?;

    let report = match args.engine {
        EngineKind::Heuristic => {
            let engine = HeuristicEngine::new().map_err(|e| CliError::Engine(e.to_string()))?;
            run_with_engine(source, engine, store, batch, &args).await?
        }
        EngineKind::Ai => {
            let generator = OllamaGenerator::new(&config.endpoint, &config.model)?;
            let engine =
                AiEngine::new(generator, RetryPolicy::default(), config.rate_capacity)
                    .map_err(|e| CliError::Engine(e.to_string()))?;
            run_with_engine(source, engine, store, batch, &args).await?
        }
    };

    println!("Run complete for channel '{}'", args.channel);
    println!("  messages:       {}", report.total_messages);
    println!("  batches:        {}", report.batches);
    println!("  failed batches: {}", report.failed_batches);
    println!("  skipped:        {}", report.skipped_batches);
    println!("  records:        {}", report.records);
    println!("Output written to {}", output_dir.display());
    Ok(())
}

async fn run_with_engine<E>(
    source: JsonExportSource,
    engine: E,
    store: FileStore,
    batch: BatchConfig,
    args: &RunArgs,
) -> Result<RunReport>
where
    E: ExtractionEngine + Send,
{
    let mut orchestrator = BatchOrchestrator::new(source, engine, store, batch);
    Ok(orchestrator.run(&args.channel, args.limit).await?)
}
