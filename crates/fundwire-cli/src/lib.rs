//! Fundwire CLI library.
//!
//! Argument parsing, configuration management, the JSON-export message
//! source and the command implementations behind the `fundwire` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod source;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use source::JsonExportSource;
