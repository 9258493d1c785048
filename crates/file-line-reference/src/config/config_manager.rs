use super::json_config::LanguagesConfig;
use crate::model::types::LanguageServerConfig;
use crate::utils::file::extension_of;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

const CONFIG_DIR_NAME: &str = "file-line-reference";

/// Loads `languages.json` from a config root once and answers lookups against it
#[derive(Debug)]
pub struct ConfigManager {
    config_root: PathBuf,
    cached_config: OnceLock<LanguagesConfig>,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified config root
    pub fn new(config_root: PathBuf) -> Self {
        Self {
            config_root,
            cached_config: OnceLock::new(),
        }
    }

    /// Create a ConfigManager over an already loaded configuration
    pub fn with_config(config: LanguagesConfig) -> Self {
        Self {
            config_root: PathBuf::new(),
            cached_config: OnceLock::from(config),
        }
    }

    /// Platform config directory, e.g. `~/.config/file-line-reference`
    pub fn default_root() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME)
    }

    pub fn config_root(&self) -> &Path {
        &self.config_root
    }

    /// Get the languages configuration, loading or creating it on first use
    pub fn get_config(&self) -> anyhow::Result<&LanguagesConfig> {
        if let Some(config) = self.cached_config.get() {
            return Ok(config);
        }
        let config = LanguagesConfig::get_or_create(self.config_root())?;
        Ok(self.cached_config.get_or_init(|| config))
    }

    /// Get language identifier for a file, from its extension
    pub fn get_language_for_path(&self, path: &Path) -> Option<String> {
        let extension = extension_of(path)?;
        self.get_config()
            .ok()
            .and_then(|c| c.get_language_for_extension(extension))
    }

    /// Get project patterns for a specific language
    pub fn get_project_patterns_for_language(&self, language: &str) -> Vec<String> {
        self.get_config()
            .map(|c| c.get_project_patterns_for_language(language))
            .unwrap_or_default()
    }

    /// Get the language server for a language
    pub fn get_server_for_language(&self, language: &str) -> Option<LanguageServerConfig> {
        self.get_config()
            .ok()
            .and_then(|c| c.get_server_for_language(language))
    }

    /// Timeout applied to server initialization and symbol requests
    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .get_config()
            .map_or(super::json_config::DEFAULT_REQUEST_TIMEOUT_SECS, |c| c.request_timeout_secs);
        Duration::from_secs(secs)
    }
}
