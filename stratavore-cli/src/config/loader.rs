use super::types::{
    AgentsConfig, RawAgentsConfig, RawStorageConfig, RawStratavoreConfig, StorageConfig,
    StratavoreConfig,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<StratavoreConfig> {
        Self::load_layers(
            Some(Self::user_config_path().as_path()),
            &Self::project_config_path(),
        )
    }

    /// Merge the user file (if any) and the project file; missing files are skipped
    pub fn load_layers(user_path: Option<&Path>, project_path: &Path) -> Result<StratavoreConfig> {
        let mut raw = RawStratavoreConfig::default();

        // Layer 1: User config
        if let Some(user_path) = user_path
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(user_path)?);
        }

        // Layer 2: Project config
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(project_path)?);
        }

        Ok(Self::finalize(raw))
    }

    /// Get user config path, `config.toml` in the XDG config directory
    pub fn user_config_path() -> PathBuf {
        stratavore_paths::config_dir().join("config.toml")
    }

    /// Get project config path
    /// Can be overridden with STRATAVORE_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("STRATAVORE_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".stratavore/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<RawStratavoreConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawStratavoreConfig, overlay: RawStratavoreConfig) -> RawStratavoreConfig {
        RawStratavoreConfig {
            storage: RawStorageConfig {
                data_dir: overlay.storage.data_dir.or(base.storage.data_dir),
            },
            agents: RawAgentsConfig {
                spawn_grace_secs: overlay
                    .agents
                    .spawn_grace_secs
                    .or(base.agents.spawn_grace_secs),
                stale_threshold_secs: overlay
                    .agents
                    .stale_threshold_secs
                    .or(base.agents.stale_threshold_secs),
                recover_on_open: overlay
                    .agents
                    .recover_on_open
                    .or(base.agents.recover_on_open),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawStratavoreConfig) -> StratavoreConfig {
        let agents = AgentsConfig::default();
        StratavoreConfig {
            storage: StorageConfig {
                data_dir: raw
                    .storage
                    .data_dir
                    .unwrap_or_else(stratavore_paths::data_dir),
            },
            agents: AgentsConfig {
                spawn_grace_secs: raw.agents.spawn_grace_secs.unwrap_or(agents.spawn_grace_secs),
                stale_threshold_secs: raw
                    .agents
                    .stale_threshold_secs
                    .unwrap_or(agents.stale_threshold_secs),
                recover_on_open: raw.agents.recover_on_open.unwrap_or(agents.recover_on_open),
            },
        }
    }
}
