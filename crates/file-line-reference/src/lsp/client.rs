use crate::lsp::protocol::*;
use crate::model::types::LanguageServerConfig;
use anyhow::Result;
use lsp_types::*;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, error, trace, warn};
use url::Url;

type PendingRequests = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value>>>>>;

/// Drops a request from the pending map when its caller stops waiting for it
struct PendingGuard {
    pending_requests: PendingRequests,
    id: u64,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let id = self.id;
        if let Ok(mut pending) = self.pending_requests.try_lock() {
            pending.remove(&id);
            return;
        }
        let pending_requests = self.pending_requests.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                pending_requests.lock().await.remove(&id);
            });
        }
    }
}

/// Language Server Protocol client for a single language server process.
///
/// Only the requests needed to outline a document are exposed: `initialize`,
/// `textDocument/didOpen`, `textDocument/documentSymbol` and `shutdown`.
pub struct LspClient {
    stdin: Arc<Mutex<ChildStdin>>,
    pending_requests: PendingRequests,
    next_id: AtomicU64,
    child: Mutex<Child>,
    config: LanguageServerConfig,
}

impl std::fmt::Debug for LspClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LspClient")
            .field("server", &self.config.name)
            .finish_non_exhaustive()
    }
}

impl LspClient {
    /// Creates a new LSP client and starts the language server process
    ///
    /// # Arguments
    /// * `config` - Language server configuration including command and args
    pub async fn new(config: LanguageServerConfig) -> Result<Self> {
        let mut child = Command::new(&config.command)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to start {}: {}", config.name, e))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow::anyhow!("No stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("No stdout"))?;

        if let Some(stderr) = child.stderr.take() {
            let server = config.name.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    trace!(target: "file_line_reference::lsp::stderr", "[{}] {}", server, line);
                }
            });
        }

        let client = Self {
            stdin: Arc::new(Mutex::new(stdin)),
            pending_requests: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            child: Mutex::new(child),
            config,
        };

        client.start_message_handler(stdout);
        debug!("Started language server {}", client.config.name);
        Ok(client)
    }

    pub fn server_name(&self) -> &str {
        &self.config.name
    }

    /// Initializes the language server with workspace configuration
    ///
    /// # Arguments
    /// * `root_uri` - Root URI of the workspace
    pub async fn initialize(&self, root_uri: Url) -> Result<InitializeResult> {
        let init_params = crate::lsp::LspConfig::build_initialize_params(
            root_uri,
            self.config.initialization_options.clone(),
        );

        let init_result: InitializeResult = self
            .send_lsp_request("initialize", init_params)
            .await?
            .ok_or_else(|| anyhow::anyhow!("{} returned no initialize result", self.config.name))?;

        self.send_notification("initialized", json!({})).await?;
        Ok(init_result)
    }

    /// Get symbols in a specific document
    ///
    /// # Returns
    /// * `Result<Option<DocumentSymbolResponse>>` - Document symbols or None
    pub async fn document_symbols(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        self.send_lsp_request("textDocument/documentSymbol", params)
            .await
    }

    /// Notify server that a document was opened
    pub async fn did_open(&self, params: DidOpenTextDocumentParams) -> Result<()> {
        self.send_notification("textDocument/didOpen", json!(params))
            .await
    }

    /// Notify server that a document was closed
    pub async fn did_close(&self, params: DidCloseTextDocumentParams) -> Result<()> {
        self.send_notification("textDocument/didClose", json!(params))
            .await
    }

    /// Ask the server to shut down, then tell it to exit and reap the process.
    ///
    /// The whole exchange is bounded by `timeout`; a server that does not
    /// finish in time, or fails along the way, is killed.
    pub async fn shutdown(&self, timeout: Duration) -> Result<()> {
        let graceful = async {
            let _: Option<Value> = self.send_lsp_request("shutdown", Value::Null).await?;
            self.send_notification("exit", Value::Null).await?;
            let status = self.child.lock().await.wait().await?;
            Ok::<_, anyhow::Error>(status)
        };

        match tokio::time::timeout(timeout, graceful).await {
            Ok(Ok(status)) => {
                debug!("{} exited with {}", self.config.name, status);
                Ok(())
            }
            Ok(Err(e)) => {
                self.kill().await;
                Err(e)
            }
            Err(_) => {
                warn!("{} did not shut down within {:?}", self.config.name, timeout);
                self.kill().await;
                Err(anyhow::anyhow!("Timed out shutting down {}", self.config.name))
            }
        }
    }

    async fn kill(&self) {
        if let Err(e) = self.child.lock().await.kill().await {
            debug!("Failed to kill {}: {}", self.config.name, e);
        }
    }

    /// Generic LSP request handler with automatic response parsing
    async fn send_lsp_request<T, R>(&self, method: &str, params: T) -> Result<Option<R>>
    where
        T: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let params = serde_json::to_value(&params)?;
        trace!("Sending LSP request: method={}, params={}", method, params);

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending_requests.lock().await.insert(id, tx);
        let _pending = PendingGuard {
            pending_requests: self.pending_requests.clone(),
            id,
        };

        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });
        self.write(&request).await?;

        let result = rx.await.map_err(|e| {
            anyhow::anyhow!("{} dropped request {}: {}", self.config.name, method, e)
        })??;
        trace!("Raw LSP response: {}", result);

        if result.is_null() {
            Ok(None)
        } else {
            Ok(Some(serde_json::from_value(result)?))
        }
    }

    /// Send LSP notification (no response expected)
    async fn send_notification(&self, method: &str, params: Value) -> Result<()> {
        let notification = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        });
        self.write(&notification).await
    }

    async fn write(&self, message: &Value) -> Result<()> {
        let content = serde_json::to_string(message)?;
        let mut stdin = self.stdin.lock().await;
        write_lsp_message(&mut *stdin, &content).await
    }

    /// Start background task to handle LSP messages from server
    fn start_message_handler(&self, stdout: tokio::process::ChildStdout) {
        let pending_requests = self.pending_requests.clone();
        let stdin = self.stdin.clone();
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);

            while let Ok(content) = read_lsp_message(&mut reader).await {
                if let Err(e) = Self::process_message(&content, &pending_requests, &stdin).await {
                    error!("Failed to process LSP message: {}", e);
                }
            }
            debug!("LSP connection closed");
            // Fail anything still waiting instead of leaving it hanging
            pending_requests.lock().await.clear();
        });
    }

    /// Route a response to its waiting request; answer server requests with a null result
    async fn process_message(
        content: &str,
        pending_requests: &PendingRequests,
        stdin: &Mutex<ChildStdin>,
    ) -> Result<()> {
        let message = parse_lsp_message(content)?;

        if message.is_server_request() {
            trace!("Server request {:?}", message.method);
            let reply = json!({ "jsonrpc": "2.0", "id": message.id, "result": Value::Null });
            let mut stdin = stdin.lock().await;
            return write_lsp_message(&mut *stdin, &serde_json::to_string(&reply)?).await;
        }

        if !message.is_response() {
            return Ok(()); // Notification
        }

        let Some(id) = message.id.as_ref().and_then(Value::as_u64) else {
            return Ok(()); // Not one of our ids
        };

        let Some(sender) = pending_requests.lock().await.remove(&id) else {
            return Ok(()); // No pending request for this ID
        };

        let result = match message.error {
            Some(error) => Err(anyhow::anyhow!("LSP Error: {}", error)),
            None => Ok(message.result.unwrap_or(Value::Null)),
        };

        let _ = sender.send(result);
        Ok(())
    }
}
