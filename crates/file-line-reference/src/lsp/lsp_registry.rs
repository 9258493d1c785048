use crate::lsp::LspClient;
use crate::model::types::LanguageServerConfig;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Registry of running, initialized language server clients keyed by server name
#[derive(Default)]
pub struct LspRegistry {
    clients: HashMap<String, Arc<LspClient>>,
    configs: HashMap<String, LanguageServerConfig>,
}

impl std::fmt::Debug for LspRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LspRegistry")
            .field("client_count", &self.clients.len())
            .field("config_count", &self.configs.len())
            .finish()
    }
}

impl LspRegistry {
    /// Create new LSP registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a language server configuration
    pub fn register_config(&mut self, config: LanguageServerConfig) {
        self.configs.insert(config.name.clone(), config);
    }

    /// Get a running client, starting and initializing the server on first use.
    ///
    /// Initialization is bounded by `timeout`; a server that fails to start or
    /// initialize is not cached, so the next call tries again.
    pub async fn get_or_start(
        &mut self,
        server_name: &str,
        root_uri: &Url,
        timeout: Duration,
    ) -> Result<Arc<LspClient>> {
        if let Some(client) = self.clients.get(server_name) {
            return Ok(client.clone());
        }

        let config = self
            .configs
            .get(server_name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Language server '{}' not registered", server_name))?;

        let client = LspClient::new(config).await?;
        match tokio::time::timeout(timeout, client.initialize(root_uri.clone())).await {
            Ok(Ok(result)) => {
                debug!(
                    "Initialized {} ({:?})",
                    server_name,
                    result.server_info.map(|info| info.name)
                );
            }
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                warn!("Language server '{}' timed out during initialization", server_name);
                return Err(anyhow::anyhow!("Timed out initializing {}", server_name));
            }
        }

        let client = Arc::new(client);
        self.clients.insert(server_name.to_string(), client.clone());
        Ok(client)
    }

    /// Shut down every running server, each bounded by `timeout`
    pub async fn shutdown_all(&mut self, timeout: Duration) {
        for (name, client) in self.clients.drain() {
            if let Err(e) = client.shutdown(timeout).await {
                warn!("Failed to shut down {}: {}", name, e);
            }
        }
    }

    /// Check if language server is registered
    pub fn is_available(&self, server_name: &str) -> bool {
        self.configs.contains_key(server_name)
    }

    /// Whether a server process is currently running
    pub fn is_running(&self, server_name: &str) -> bool {
        self.clients.contains_key(server_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config(name: &str, command: &str) -> LanguageServerConfig {
        LanguageServerConfig {
            name: name.to_string(),
            command: command.to_string(),
            args: vec![],
            initialization_options: None,
        }
    }

    #[test]
    fn test_new_registry() {
        let registry = LspRegistry::new();
        assert!(!registry.is_available("clangd"));
        assert!(!registry.is_running("clangd"));
    }

    #[test]
    fn test_register_config_overwrites_existing() {
        let mut registry = LspRegistry::new();
        registry.register_config(create_test_config("clangd", "clangd"));
        registry.register_config(create_test_config("clangd", "clangd-18"));

        assert_eq!(registry.configs["clangd"].command, "clangd-18");
        assert!(registry.is_available("clangd"));
        assert!(!registry.is_available("ccls"));
        assert!(!registry.is_running("clangd"));
    }

    #[tokio::test]
    async fn test_get_or_start_unregistered() {
        let mut registry = LspRegistry::new();
        let root = Url::parse("file:///tmp").unwrap();

        let err = registry
            .get_or_start("clangd", &root, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not registered"));
    }

    #[tokio::test]
    async fn test_get_or_start_missing_binary_is_not_cached() {
        let mut registry = LspRegistry::new();
        registry.register_config(create_test_config(
            "ghost",
            "file-line-reference-no-such-server",
        ));
        let root = Url::parse("file:///tmp").unwrap();

        let result = registry
            .get_or_start("ghost", &root, Duration::from_secs(1))
            .await;
        assert!(result.is_err());
        assert!(!registry.is_running("ghost"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_get_or_start_times_out_silent_server() {
        let mut registry = LspRegistry::new();
        let mut config = create_test_config("silent", "sleep");
        config.args = vec!["30".to_string()];
        registry.register_config(config);
        let root = Url::parse("file:///tmp").unwrap();

        let err = registry
            .get_or_start("silent", &root, Duration::from_millis(200))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Timed out initializing"));
        assert!(!registry.is_running("silent"));
        registry.shutdown_all(Duration::from_millis(200)).await;
    }
}
