use crate::model::types::LanguageServerConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "languages.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LanguageConfig {
    pub file_extensions: Vec<String>,
    #[serde(default)]
    pub project_patterns: Vec<String>,
    /// Language server providing document symbols, if any
    #[serde(default)]
    pub server: Option<LanguageServerConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LanguagesConfig {
    /// Keyed by editor language identifier (`cpp`, `objective-c`, ...)
    pub languages: BTreeMap<String, LanguageConfig>,
    /// Upper bound for server initialization and each symbol request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl LanguagesConfig {
    /// Get or create configuration in config root folder
    pub fn get_or_create(config_root: &Path) -> Result<Self> {
        let config_path = config_root.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            return Self::load_from(&config_path);
        }

        let default_config = Self::default_config();
        std::fs::create_dir_all(config_root)?;
        let config_json = serde_json::to_string_pretty(&default_config)?;
        std::fs::write(&config_path, config_json)?;
        tracing::debug!("Wrote default language config to {}", config_path.display());
        Ok(default_config)
    }

    /// Load configuration from a JSON file
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid language config {}", config_path.display()))
    }

    /// Get language identifier for a file extension (case-insensitive)
    pub fn get_language_for_extension(&self, extension: &str) -> Option<String> {
        self.languages
            .iter()
            .find(|(_, config)| {
                config
                    .file_extensions
                    .iter()
                    .any(|ext| ext.eq_ignore_ascii_case(extension))
            })
            .map(|(language, _)| language.clone())
    }

    /// Get project patterns for a specific language
    pub fn get_project_patterns_for_language(&self, language: &str) -> Vec<String> {
        self.languages
            .get(language)
            .map(|config| config.project_patterns.clone())
            .unwrap_or_default()
    }

    /// Get the language server serving a language, if one is configured
    pub fn get_server_for_language(&self, language: &str) -> Option<LanguageServerConfig> {
        self.languages.get(language).and_then(|config| config.server.clone())
    }

    /// All distinct language server configs, keyed by server name
    pub fn all_servers(&self) -> Vec<LanguageServerConfig> {
        let mut servers: BTreeMap<String, LanguageServerConfig> = BTreeMap::new();
        for server in self.languages.values().filter_map(|c| c.server.as_ref()) {
            servers
                .entry(server.name.clone())
                .or_insert_with(|| server.clone());
        }
        servers.into_values().collect()
    }

    /// Default embedded configuration: clangd for the C family, Java by line scan
    pub fn default_config() -> Self {
        let clangd = LanguageServerConfig {
            name: "clangd".to_string(),
            command: "clangd".to_string(),
            args: vec!["--background-index=false".to_string()],
            initialization_options: Some(json!({})),
        };
        let c_patterns = strings(&[
            "compile_commands.json",
            "compile_flags.txt",
            ".clangd",
            "CMakeLists.txt",
            "Makefile",
            ".git",
        ]);
        let objc_patterns = strings(&[
            "compile_commands.json",
            ".clangd",
            "Podfile",
            "Package.swift",
            ".git",
        ]);

        let mut languages = BTreeMap::new();
        languages.insert(
            "c".to_string(),
            LanguageConfig {
                file_extensions: strings(&["c"]),
                project_patterns: c_patterns.clone(),
                server: Some(clangd.clone()),
            },
        );
        languages.insert(
            "cpp".to_string(),
            LanguageConfig {
                file_extensions: strings(&["cpp", "cc", "cxx", "c++", "h", "hpp", "hh", "hxx"]),
                project_patterns: c_patterns,
                server: Some(clangd.clone()),
            },
        );
        languages.insert(
            "objective-c".to_string(),
            LanguageConfig {
                file_extensions: strings(&["m"]),
                project_patterns: objc_patterns.clone(),
                server: Some(clangd.clone()),
            },
        );
        languages.insert(
            "objective-cpp".to_string(),
            LanguageConfig {
                file_extensions: strings(&["mm"]),
                project_patterns: objc_patterns,
                server: Some(clangd),
            },
        );
        languages.insert(
            "java".to_string(),
            LanguageConfig {
                file_extensions: strings(&["java"]),
                project_patterns: strings(&["pom.xml", "build.gradle", "build.gradle.kts", ".git"]),
                server: None,
            },
        );

        Self {
            languages,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
