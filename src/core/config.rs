//! Configuration: defaults, then `config.json`, then environment variables.
//! Command-line flags are applied on top by the caller.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::parser::ParseOptions;
use crate::core::paths;
use crate::core::translate::AutoTranslateSettings;

pub const ENV_EMOTICONS: &str = "CHAT_MD_EMOTICONS";
pub const ENV_CUSTOM_DOMAINS: &str = "CHAT_MD_CUSTOM_DOMAINS";
pub const ENV_AUTO_TRANSLATE: &str = "CHAT_MD_AUTO_TRANSLATE";
pub const ENV_SUBSCRIPTION_AUTO_TRANSLATE: &str = "CHAT_MD_SUBSCRIPTION_AUTO_TRANSLATE";
pub const ENV_LANGUAGE: &str = "CHAT_MD_AUTO_TRANSLATE_LANGUAGE";
pub const ENV_VIEWER_ID: &str = "CHAT_MD_VIEWER_ID";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub parse: ParseOptions,
    pub auto_translate: AutoTranslateSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Invalid config file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{var} must be a boolean (1/0, true/false, yes/no, on/off), got {value:?}")]
    InvalidBool { var: &'static str, value: String },
}

/// Load configuration from the config file (if present) and the environment.
pub fn load() -> Result<Config, ConfigError> {
    let path = paths::config_file();
    load_with(path.as_deref(), |name| env::var(name).ok())
}

/// Load configuration from `path` and the variables returned by `lookup`.
/// A missing file is not an error.
pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_file(path)?.unwrap_or_default(),
        None => Config::default(),
    };
    apply_env(&mut config, lookup)?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<Option<Config>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("No config file at {}", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let config = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

fn apply_env<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(ENV_EMOTICONS) {
        config.parse.emoticons = parse_bool(ENV_EMOTICONS, &v)?;
    }
    if let Some(v) = get(ENV_CUSTOM_DOMAINS) {
        config.parse.custom_domains = split_list(&v);
    }
    if let Some(v) = get(ENV_AUTO_TRANSLATE) {
        config.auto_translate.enabled = parse_bool(ENV_AUTO_TRANSLATE, &v)?;
    }
    if let Some(v) = get(ENV_SUBSCRIPTION_AUTO_TRANSLATE) {
        config.auto_translate.subscription_auto_translate =
            parse_bool(ENV_SUBSCRIPTION_AUTO_TRANSLATE, &v)?;
    }
    if let Some(v) = get(ENV_LANGUAGE) {
        config.auto_translate.language = Some(v.trim().to_string());
    }
    if let Some(v) = get(ENV_VIEWER_ID) {
        config.auto_translate.viewer_id = Some(v.trim().to_string());
    }
    Ok(())
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}

/// Comma-separated list, trimmed, empties dropped.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
