//! Fundwire CLI - extract structured investment records from announcement feeds.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fundwire_cli::commands;
use fundwire_cli::{Cli, Command, Config};

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout is reserved for command output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> fundwire_cli::Result<()> {
    let cli = Cli::parse();

    // Load or create config
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|_| {
            let cfg = Config::default();
            cfg.save().ok();
            cfg
        }),
    };

    match cli.command {
        Command::Run(args) => commands::execute_run(args, &config).await?,
        Command::Parse(args) => commands::execute_parse(args)?,
        Command::Status(args) => commands::execute_status(args, &config)?,
        Command::Reset(args) => commands::execute_reset(args, &config)?,
    }

    Ok(())
}
