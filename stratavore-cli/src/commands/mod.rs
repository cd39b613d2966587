//! Subcommand implementations

pub mod agent;
pub mod jobs;
pub mod time;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use stratavore_core::JsonlStore;
use tracing::debug;

use crate::config::{ConfigLoader, StratavoreConfig};

/// Everything a command needs: merged config and the shared record store
pub struct Context {
    pub config: StratavoreConfig,
    pub store: Arc<JsonlStore>,
}

impl Context {
    /// Load config; `data_dir` from the command line wins over every file
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = ConfigLoader::load()?;
        if let Some(dir) = data_dir {
            config.storage.data_dir = dir;
        }
        debug!(data_dir = %config.storage.data_dir.display(), "Using data directory");

        let store = Arc::new(JsonlStore::new(config.storage.data_dir.clone()));
        Ok(Self { config, store })
    }
}

/// Table with the house style and cyan headers
pub(crate) fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

/// Truncate string with ellipsis
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
