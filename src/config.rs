//! Configuration management
//!
//! Agent settings live in a TOML file under the user config directory.
//! Every section has working defaults, so a missing file or a file with
//! only a few overrides is fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::engine::EngineConfig;
use crate::knowledge::history;
use crate::knowledge::store;
use crate::persistence;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Definition lookup backend.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Knowledge persistence endpoints.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Learning loop behavior.
    #[serde(default)]
    pub learning: LearningConfig,
    /// Capacity limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Definition lookup endpoint.
    #[serde(default = "default_lookup_url")]
    pub lookup_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_lookup_url() -> String {
    "http://localhost:8080/fetch-word-data".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            lookup_url: default_lookup_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Endpoint accepting save chunks.
    #[serde(default = "default_save_url")]
    pub save_url: String,
    /// Endpoint serving the persisted blob.
    #[serde(default = "default_load_url")]
    pub load_url: String,
    /// Entries per save chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_save_url() -> String {
    "http://localhost:8080/save-training-data".to_string()
}

fn default_load_url() -> String {
    "http://localhost:8080/training.json".to_string()
}

fn default_chunk_size() -> usize {
    persistence::DEFAULT_CHUNK_SIZE
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_url: default_save_url(),
            load_url: default_load_url(),
            chunk_size: default_chunk_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Word the loop starts from when none is given on the command line.
    #[serde(default = "default_seed_word")]
    pub seed_word: String,
    /// Pause between loop iterations, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_seed_word() -> String {
    "spear".to_string()
}

fn default_interval_ms() -> u64 {
    1000
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            seed_word: default_seed_word(),
            interval_ms: default_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum words held in the knowledge store.
    #[serde(default = "default_store_capacity")]
    pub store_capacity: usize,
    /// Maximum related words tracked per entry.
    #[serde(default = "default_related_capacity")]
    pub related_capacity: usize,
    /// Definition texts kept for fallback selection.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

fn default_store_capacity() -> usize {
    store::DEFAULT_CAPACITY
}

fn default_related_capacity() -> usize {
    store::DEFAULT_RELATED_CAPACITY
}

fn default_history_capacity() -> usize {
    history::DEFAULT_HISTORY_CAPACITY
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            store_capacity: default_store_capacity(),
            related_capacity: default_related_capacity(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl Config {
    /// Path of the config file under the user config directory.
    pub fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not determine config directory")?;
        Ok(base.join("word-explorer").join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file
    /// does not exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Write the configuration to the default location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// The engine-facing slice of this configuration.
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            interval_ms: self.learning.interval_ms,
            store_capacity: self.limits.store_capacity,
            related_capacity: self.limits.related_capacity,
            history_capacity: self.limits.history_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_capacity_constants() {
        let config = Config::default();
        assert_eq!(config.limits.store_capacity, store::DEFAULT_CAPACITY);
        assert_eq!(config.limits.related_capacity, store::DEFAULT_RELATED_CAPACITY);
        assert_eq!(config.persistence.chunk_size, persistence::DEFAULT_CHUNK_SIZE);
        assert_eq!(config.learning.seed_word, "spear");
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.learning.interval_ms, 1000);
        assert_eq!(config.limits.history_capacity, 50);
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [learning]
            seed_word = "anchor"
            "#,
        )
        .unwrap();
        assert_eq!(config.learning.seed_word, "anchor");
        assert_eq!(config.learning.interval_ms, 1000);
        assert_eq!(config.limits.store_capacity, 1000);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.learning.seed_word = "anchor".to_string();
        config.limits.store_capacity = 123;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.learning.seed_word, "anchor");
        assert_eq!(loaded.limits.store_capacity, 123);
        assert_eq!(loaded.provider.timeout_secs, 30);
    }
}
