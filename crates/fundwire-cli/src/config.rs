//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration, persisted at `~/.fundwire/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model name passed to the generation service
    #[serde(default = "default_model")]
    pub model: String,

    /// Generation service endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Directory for raw, batch, checkpoint and summary files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Messages per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Generation requests allowed per minute
    #[serde(default = "default_rate_capacity")]
    pub rate_capacity: u32,
}

fn default_model() -> String {
    "llama3.1".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_batch_size() -> usize {
    50
}

fn default_rate_capacity() -> u32 {
    30
}

impl Config {
    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".fundwire").join("config.toml"))
    }

    /// Load configuration from file or fall back to defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to its default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values no run could work with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(CliError::Config("batch_size must be at least 1".into()));
        }
        if self.rate_capacity == 0 {
            return Err(CliError::Config("rate_capacity must be at least 1".into()));
        }
        if self.model.trim().is_empty() {
            return Err(CliError::Config("model must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            output_dir: default_output_dir(),
            batch_size: default_batch_size(),
            rate_capacity: default_rate_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.model = "mistral".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.model, "mistral");
        assert_eq!(loaded.batch_size, 50);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.rate_capacity, 30);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = \"phi3\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.model, "phi3");
        assert_eq!(config.endpoint, "http://localhost:11434");
    }

    #[test]
    fn zero_batch_size_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "batch_size = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
