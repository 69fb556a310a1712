//! Configuration Module
//!
//! This module defines all configuration structures for the handler node.
//! Configuration is loaded from TOML files and parsed using serde.

use crate::{GenesisEntry, pool::UtxoPool};
use serde::Deserialize;
use std::fs;

/// Main configuration structure
///
/// Loaded from a TOML file (e.g., config/default.toml).
///
/// # Example TOML
/// ```toml
/// [epoch]
/// interval_ms = 5000
/// max_candidates = 1000
///
/// [api]
/// host = "127.0.0.1"
/// port = 8545
///
/// [ledger]
/// genesis_path = "config/genesis.json"
///
/// [database]
/// url = "sqlite://epochs.db?mode=rwc"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub epoch: EpochConfig,
    pub api: ApiConfig,
    pub ledger: LedgerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Epoch scheduling configuration
///
/// # Fields
/// - `interval_ms`: How often queued candidates are resolved (in milliseconds)
/// - `max_candidates`: Maximum candidates drained into a single epoch
#[derive(Debug, Clone, Deserialize)]
pub struct EpochConfig {
    pub interval_ms: u64,
    pub max_candidates: usize,
}

impl EpochConfig {
    /// Both settings must be non-zero, otherwise no epoch would ever resolve a
    /// queued candidate
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval_ms == 0 {
            anyhow::bail!("epoch.interval_ms must be greater than zero");
        }
        if self.max_candidates == 0 {
            anyhow::bail!("epoch.max_candidates must be greater than zero");
        }
        Ok(())
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

/// Initial pool
///
/// `genesis_path` points to a JSON array of `{tx_hash, index, value, owner}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    pub genesis_path: String,
}

/// Database configuration
///
/// Settings for the epoch metadata registry database.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Logging configuration, overridden by `RUST_LOG` when set
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration text
    ///
    /// # Returns
    /// * `Err` if the TOML is invalid or an epoch setting is zero
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.epoch.validate()?;
        Ok(config)
    }
}

impl LedgerConfig {
    /// Read the genesis file into a pool
    pub fn load_pool(&self) -> anyhow::Result<UtxoPool> {
        let content = fs::read_to_string(&self.genesis_path)?;
        let entries: Vec<GenesisEntry> = serde_json::from_str(&content)?;
        Ok(UtxoPool::from_genesis(entries)?)
    }
}
