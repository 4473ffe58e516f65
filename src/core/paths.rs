//! Config file location.

use std::path::PathBuf;

use crate::core::app;

/// Overrides the config file path.
pub const CONFIG_ENV: &str = "CHAT_MD_CONFIG";

/// Project directories from the standard platform locations.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", app::NAME)
}

/// Config directory (~/.config/chat-md/).
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// Config file: `$CHAT_MD_CONFIG` when set, else `config.json` in the config directory.
pub fn config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        return Some(PathBuf::from(path));
    }
    config_dir().map(|d| d.join("config.json"))
}
