//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fundwire - extract structured investment records from announcement feeds.
#[derive(Debug, Parser)]
#[command(name = "fundwire")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to ~/.fundwire/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the batch pipeline over a channel export file
    Run(RunArgs),

    /// Parse one message with the deterministic engine and print the record
    Parse(ParseArgs),

    /// Show the checkpoint state for a channel
    Status(StatusArgs),

    /// Delete the checkpoint for a channel so the next run starts over
    Reset(ResetArgs),
}

/// Which extraction engine drives a run.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum EngineKind {
    /// Model-backed extraction with retry and rate limiting
    Ai,
    /// Deterministic regex extraction, no network
    Heuristic,
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Channel name; keys the output files and the checkpoint
    pub channel: String,

    /// JSON export file containing the channel messages
    #[arg(short, long)]
    pub input: PathBuf,

    /// Maximum number of messages to process
    #[arg(short, long, default_value = "1000")]
    pub limit: usize,

    /// Extraction engine
    #[arg(short, long, value_enum, default_value = "ai")]
    pub engine: EngineKind,

    /// Output directory (overrides the configured one)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the parse command.
#[derive(Debug, Parser)]
pub struct ParseArgs {
    /// Message text; omit to read from a file
    pub text: Option<String>,

    /// Read the message text from a file instead
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Arguments for the status command.
#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Channel name
    pub channel: String,

    /// Output directory (overrides the configured one)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the reset command.
#[derive(Debug, Parser)]
pub struct ResetArgs {
    /// Channel name
    pub channel: String,

    /// Output directory (overrides the configured one)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
