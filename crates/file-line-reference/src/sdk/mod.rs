//! # Reference SDK
//!
//! The reference builder, symbol resolver, and the [`FileLineReference`]
//! command facade, plus the builder that wires them to concrete hosts.

pub mod client;
pub mod reference_builder;
pub mod services;
pub mod symbol_resolver;
pub mod workspace_manager;

use crate::config::{ConfigManager, LanguagesConfig};
use crate::sdk::client::FileLineReference;
use crate::sdk::services::{
    Clipboard, LspSymbolProvider, StderrStatus, StatusSink, SymbolProvider, SystemClipboard,
};
use std::path::PathBuf;
use std::sync::Arc;
pub use workspace_manager::WorkspaceManager;

/// **Builder for configuring FileLineReference instances**
///
/// Defaults: language servers from `languages.json` in the platform config
/// directory, the system clipboard, and status messages on stderr.
///
/// # Examples
/// ```no_run
/// use file_line_reference::FileLineReference;
/// use file_line_reference::sdk::services::{SilentStatus, StdoutClipboard};
/// use std::path::PathBuf;
/// use std::sync::Arc;
///
/// let copier = FileLineReference::builder()
///     .workspace_root(PathBuf::from("/path/to/project"))
///     .clipboard(Arc::new(StdoutClipboard))
///     .status(Arc::new(SilentStatus))
///     .build()
///     .expect("Failed to build");
/// ```
#[derive(Default)]
pub struct FileLineReferenceBuilder {
    config_root: Option<PathBuf>,
    config: Option<LanguagesConfig>,
    workspace_root: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    symbol_provider: Option<Arc<dyn SymbolProvider>>,
    clipboard: Option<Arc<dyn Clipboard>>,
    status: Option<Arc<dyn StatusSink>>,
}

impl FileLineReferenceBuilder {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding `languages.json`
    pub fn config_root(mut self, root: PathBuf) -> Self {
        self.config_root = Some(root);
        self
    }

    /// Use an in-memory language configuration instead of reading one from disk
    pub fn config(mut self, config: LanguagesConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Root handed to language servers instead of detecting one per file
    pub fn workspace_root(mut self, root: PathBuf) -> Self {
        self.workspace_root = Some(root);
        self
    }

    /// Override the configured language server timeout
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Replace the LSP-backed symbol provider
    pub fn symbol_provider(mut self, provider: Arc<dyn SymbolProvider>) -> Self {
        self.symbol_provider = Some(provider);
        self
    }

    pub fn clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn status(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = Some(status);
        self
    }

    /// Build the FileLineReference instance
    pub fn build(self) -> anyhow::Result<FileLineReference> {
        let symbol_provider = match self.symbol_provider {
            Some(provider) => provider,
            None => {
                let mut config = match self.config {
                    Some(config) => config,
                    None => {
                        let root = self.config_root.unwrap_or_else(ConfigManager::default_root);
                        ConfigManager::new(root).get_config()?.clone()
                    }
                };
                if let Some(secs) = self.request_timeout_secs {
                    config.request_timeout_secs = secs;
                }
                let config_manager = Arc::new(ConfigManager::with_config(config));
                let workspace_manager = WorkspaceManager::new(config_manager, self.workspace_root);
                Arc::new(LspSymbolProvider::new(workspace_manager))
            }
        };

        Ok(FileLineReference::new(
            symbol_provider,
            self.clipboard.unwrap_or_else(|| Arc::new(SystemClipboard::new())),
            self.status.unwrap_or_else(|| Arc::new(StderrStatus)),
        ))
    }
}
