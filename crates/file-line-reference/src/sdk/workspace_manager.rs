use crate::config::ConfigManager;
use crate::lsp::{LspClient, LspRegistry};
use crate::model::entities::Document;
use crate::utils::file::file_uri;
use anyhow::Result;
use lsp_types::{
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, TextDocumentIdentifier,
    TextDocumentItem,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Maps documents to language servers and keeps server-side document state in sync
#[derive(Debug)]
pub struct WorkspaceManager {
    config_manager: Arc<ConfigManager>,
    workspace_root: Option<PathBuf>,
    registry: LspRegistry,
    opened_files: HashMap<Url, i32>, // uri -> last version sent
}

impl WorkspaceManager {
    /// Create a manager; `workspace_root` overrides per-file root detection
    pub fn new(config_manager: Arc<ConfigManager>, workspace_root: Option<PathBuf>) -> Self {
        let mut registry = LspRegistry::new();
        if let Ok(config) = config_manager.get_config() {
            for server in config.all_servers() {
                registry.register_config(server);
            }
        }

        Self {
            config_manager,
            workspace_root,
            registry,
            opened_files: HashMap::new(),
        }
    }

    /// Detect workspace root by walking up from the file to find project markers
    pub fn detect_workspace_root(file_path: &Path, patterns: &[String]) -> Option<PathBuf> {
        let mut current = file_path.parent()?;
        loop {
            if patterns.iter().any(|pattern| current.join(pattern).exists()) {
                return Some(current.to_path_buf());
            }
            current = current.parent()?;
        }
    }

    /// Root handed to the server: the override, a detected project root, or the file's directory
    pub fn workspace_root_for(&self, file_path: &Path, language_id: &str) -> PathBuf {
        if let Some(root) = &self.workspace_root {
            return root.clone();
        }
        let patterns = self.config_manager.get_project_patterns_for_language(language_id);
        Self::detect_workspace_root(file_path, &patterns)
            .or_else(|| file_path.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("/"))
    }

    pub fn request_timeout(&self) -> Duration {
        self.config_manager.request_timeout()
    }

    /// Running client for the document's language, or `None` when no server is configured
    pub async fn client_for_document(
        &mut self,
        document: &Document,
    ) -> Result<Option<Arc<LspClient>>> {
        let Some(path) = document.path() else {
            return Ok(None);
        };
        let Some(server) = self
            .config_manager
            .get_server_for_language(document.language_id())
        else {
            debug!("No language server configured for {}", document.language_id());
            return Ok(None);
        };

        let root = self.workspace_root_for(path, document.language_id());
        let root_uri = file_uri(&root)?;
        debug!("Using {} with root {}", server.name, root.display());

        let timeout = self.request_timeout();
        let client = self
            .registry
            .get_or_start(&server.name, &root_uri, timeout)
            .await?;
        Ok(Some(client))
    }

    /// Send the document text to the server, reopening it if it was sent before
    pub async fn open_document(&mut self, client: &LspClient, document: &Document) -> Result<Url> {
        let path = document
            .path()
            .ok_or_else(|| anyhow::anyhow!("Untitled documents cannot be opened on a server"))?;
        let uri = file_uri(path)?;

        let version = match self.opened_files.get(&uri) {
            Some(previous) => {
                client
                    .did_close(DidCloseTextDocumentParams {
                        text_document: TextDocumentIdentifier { uri: uri.clone() },
                    })
                    .await?;
                previous + 1
            }
            None => 1,
        };

        client
            .did_open(DidOpenTextDocumentParams {
                text_document: TextDocumentItem {
                    uri: uri.clone(),
                    language_id: document.language_id().to_string(),
                    version,
                    text: document.text().to_string(),
                },
            })
            .await?;
        self.opened_files.insert(uri.clone(), version);
        Ok(uri)
    }

    /// Shut down all running servers
    pub async fn shutdown(&mut self) {
        let timeout = self.request_timeout();
        self.registry.shutdown_all(timeout).await;
        self.opened_files.clear();
    }
}
