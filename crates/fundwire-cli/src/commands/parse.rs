//! The parse command: one message through the deterministic engine.

use std::io::Read;

use chrono::Utc;

use crate::cli::ParseArgs;
use crate::error::{CliError, Result};

use fundwire_domain::RawMessage;
use fundwire_extractor::HeuristicEngine;

pub fn execute_parse(args: ParseArgs) -> Result<()> {
    let text = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => {
            // No argument: read the message from stdin.
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    if text.trim().is_empty() {
        return Err(CliError::InvalidInput("message text is empty".into()));
    }

    let engine = HeuristicEngine::new().map_err(|e| CliError::Engine(e.to_string()))?;
    let message = RawMessage::new(0, Utc::now().to_rfc3339(), text);
    match engine.extract(&message) {
        Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        None => eprintln!("No investment data found."),
    }
    Ok(())
}
