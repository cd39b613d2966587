use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use stratavore_core::AgentManagerConfig;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStratavoreConfig {
    #[serde(default)]
    pub storage: RawStorageConfig,

    #[serde(default)]
    pub agents: RawAgentsConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStorageConfig {
    /// Directory holding the record files
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAgentsConfig {
    pub spawn_grace_secs: Option<u64>,
    pub stale_threshold_secs: Option<u64>,
    pub recover_on_open: Option<bool>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StratavoreConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub agents: AgentsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: stratavore_paths::data_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentsConfig {
    /// Seconds before a spawned agent becomes idle
    pub spawn_grace_secs: u64,

    /// Seconds after which a spawning agent is considered stuck
    pub stale_threshold_secs: u64,

    /// Recover stuck agents whenever the fleet is loaded
    pub recover_on_open: bool,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            spawn_grace_secs: DEFAULT_SPAWN_GRACE_SECS,
            stale_threshold_secs: DEFAULT_STALE_THRESHOLD_SECS,
            recover_on_open: true,
        }
    }
}

impl AgentsConfig {
    pub fn to_manager_config(&self) -> AgentManagerConfig {
        AgentManagerConfig {
            spawn_grace: Duration::from_secs(self.spawn_grace_secs),
            stale_threshold: Duration::from_secs(self.stale_threshold_secs),
            recover_on_open: self.recover_on_open,
        }
    }
}

pub const DEFAULT_SPAWN_GRACE_SECS: u64 = 2;
pub const DEFAULT_STALE_THRESHOLD_SECS: u64 = 30;
