//! The reset command: discard a channel's checkpoint.

use crate::cli::ResetArgs;
use crate::config::Config;
use crate::error::Result;

use fundwire_store::FileStore;

pub fn execute_reset(args: ResetArgs, config: &Config) -> Result<()> {
    let output_dir = args.output.unwrap_or_else(|| config.output_dir.clone());
    let store = FileStore::open(&output_dir)?;
    if store.read_checkpoint(&args.channel)?.is_none() {
        println!("No checkpoint for channel '{}'", args.channel);
        return Ok(());
    }
    store.delete_checkpoint(&args.channel)?;
    println!(
        "Checkpoint for channel '{}' removed; the next run starts from the beginning.",
        args.channel
    );
    Ok(())
}
