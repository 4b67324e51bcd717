//! The status command: show a channel's checkpoint state.

use crate::cli::StatusArgs;
use crate::config::Config;
use crate::error::Result;

use fundwire_store::FileStore;

pub fn execute_status(args: StatusArgs, config: &Config) -> Result<()> {
    let output_dir = args.output.unwrap_or_else(|| config.output_dir.clone());
    let store = FileStore::open(&output_dir)?;
    match store.read_checkpoint(&args.channel)? {
        Some(state) => {
            println!("Checkpoint for channel '{}'", state.channel);
            println!("  last batch index: {}", state.last_batch_index);
            println!("  next batch index: {}", state.next_batch_index());
            println!("  total processed:  {}", state.total_processed);
            println!("  batch size:       {}", state.batch_size);
            println!("  last update:      {}", state.last_processed_time);
            if state.errors.is_empty() {
                println!("  errors:           none");
            } else {
                println!("  errors:           {}", state.errors.len());
                for entry in &state.errors {
                    println!("    batch {}: {} ({})", entry.batch, entry.message, entry.time);
                }
            }
        }
        None => println!("No checkpoint for channel '{}'", args.channel),
    }
    Ok(())
}
