//! XDG Base Directory paths for stratavore.
//!
//! The CLI keeps its config and its record files in XDG locations on every
//! platform, the same way tools like gh and kubectl do.

use std::path::PathBuf;

const APP_DIR: &str = "stratavore";

/// Get the stratavore config directory.
///
/// Returns `$XDG_CONFIG_HOME/stratavore` if set, otherwise `~/.config/stratavore`.
///
/// # Examples
///
/// ```
/// use stratavore_paths::config_dir;
///
/// let config = config_dir();
/// let file = config.join("config.toml");
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join(APP_DIR)
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config").join(APP_DIR)
    } else {
        PathBuf::from(".config").join(APP_DIR)
    }
}

/// Get the stratavore data directory.
///
/// Returns `$XDG_DATA_HOME/stratavore` if set, otherwise `~/.local/share/stratavore`.
/// Agent, job, session and activity record files live here.
///
/// # Examples
///
/// ```
/// use stratavore_paths::data_dir;
///
/// let data = data_dir();
/// let jobs = data.join("jobs.jsonl");
/// ```
pub fn data_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join(APP_DIR)
    } else if let Some(home) = dirs::home_dir() {
        home.join(".local/share").join(APP_DIR)
    } else {
        PathBuf::from(".local/share").join(APP_DIR)
    }
}
