//! TOML configuration persisted under `~/.agenthive/config.toml`
//!
//! Missing sections fall back to defaults; a missing file is created
//! with defaults on first load.

use crate::agent::AgentCoreConfig;
use crate::memory::MemoryConfig;
use crate::models::client::{DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL, DEFAULT_OLLAMA_URL};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub endpoint: EndpointConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub memory: MemorySection,
}

/// Model endpoint and model names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }
}

/// Agent loop bounds and policy switches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_iterations: usize,
    pub timeout_seconds: u64,
    pub max_tool_calls_per_iteration: usize,
    pub reflection_enabled: bool,
    pub reflection_counts_iteration: bool,
    pub recall_k: usize,
    pub verbose: bool,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let defaults = AgentCoreConfig::default();
        Self {
            max_iterations: defaults.max_iterations,
            timeout_seconds: defaults.timeout.as_secs(),
            max_tool_calls_per_iteration: defaults.max_tool_calls_per_iteration,
            reflection_enabled: defaults.reflection_enabled,
            reflection_counts_iteration: defaults.reflection_counts_iteration,
            recall_k: defaults.recall_k,
            verbose: defaults.verbose,
        }
    }
}

/// Memory bounds and recall tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySection {
    pub max_short_term: usize,
    pub relevance_threshold: f32,
    pub recent_window: usize,
}

impl Default for MemorySection {
    fn default() -> Self {
        let defaults = MemoryConfig::default();
        Self {
            max_short_term: defaults.max_short_term,
            relevance_threshold: defaults.relevance_threshold,
            recent_window: defaults.recent_window,
        }
    }
}

impl Config {
    /// Load configuration from the default path, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Config::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".agenthive").join("config.toml"))
    }

    /// Agent loop bounds derived from the `[limits]` section
    pub fn agent_core_config(&self) -> AgentCoreConfig {
        AgentCoreConfig {
            max_iterations: self.limits.max_iterations,
            timeout: Duration::from_secs(self.limits.timeout_seconds),
            max_tool_calls_per_iteration: self.limits.max_tool_calls_per_iteration,
            reflection_enabled: self.limits.reflection_enabled,
            reflection_counts_iteration: self.limits.reflection_counts_iteration,
            recall_k: self.limits.recall_k,
            verbose: self.limits.verbose,
        }
    }

    /// Memory bounds derived from the `[memory]` section
    pub fn memory_config(&self) -> MemoryConfig {
        MemoryConfig {
            max_short_term: self.memory.max_short_term,
            relevance_threshold: self.memory.relevance_threshold,
            recent_window: self.memory.recent_window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoint.base_url, DEFAULT_OLLAMA_URL);
        assert_eq!(config.limits.max_iterations, 10);
        assert!(config.limits.reflection_counts_iteration);
        assert_eq!(config.memory.max_short_term, 50);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [limits]
            max_iterations = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.limits.max_iterations, 3);
        // unspecified fields and sections keep their defaults
        assert_eq!(config.limits.timeout_seconds, 120);
        assert_eq!(config.endpoint.chat_model, DEFAULT_CHAT_MODEL);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.endpoint.chat_model = "llama3.2:3b".to_string();
        config.limits.reflection_enabled = true;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.endpoint.chat_model, "llama3.2:3b");
        assert!(loaded.limits.reflection_enabled);
    }

    #[test]
    fn test_derived_runtime_configs() {
        let mut config = Config::default();
        config.limits.timeout_seconds = 30;
        config.memory.recent_window = 7;

        assert_eq!(config.agent_core_config().timeout, Duration::from_secs(30));
        assert_eq!(config.memory_config().recent_window, 7);
    }
}
