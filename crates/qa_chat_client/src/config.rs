//! Client config load/save for `~/.qa-chat/config.yaml`.

use std::path::{Path, PathBuf};

use crate::controller::DEFAULT_GREETING;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Backend location.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ServerSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Conversation behaviour.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ChatSection {
    /// Mask chat failures with canned replies (default true).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_replies: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typing_indicator: Option<bool>,
    /// Escape HTML before formatting (default true).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escape_html: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub chat: ChatSection,
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.server.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn fallback_replies(&self) -> bool {
        self.chat.fallback_replies.unwrap_or(true)
    }

    pub fn typing_indicator(&self) -> bool {
        self.chat.typing_indicator.unwrap_or(false)
    }

    pub fn escape_html(&self) -> bool {
        self.chat.escape_html.unwrap_or(true)
    }

    pub fn greeting(&self) -> &str {
        self.chat.greeting.as_deref().unwrap_or(DEFAULT_GREETING)
    }
}

/// Returns the default config file path: `~/.qa-chat/config.yaml` (platform-specific).
pub fn default_config_path() -> Option<PathBuf> {
    let home = home_dir()?;
    Some(home.join(".qa-chat").join("config.yaml"))
}

#[cfg(unix)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(windows)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE").map(PathBuf::from)
}

#[cfg(not(any(unix, windows)))]
fn home_dir() -> Option<PathBuf> {
    None
}

/// Load config from a YAML file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&contents)?)
}

/// Like [`load`], but a missing file yields the defaults.
pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        load(path)
    } else {
        Ok(Config::default())
    }
}

/// Save config to a YAML file. Creates parent directory if missing.
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_yaml::to_string(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Config load/save error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
