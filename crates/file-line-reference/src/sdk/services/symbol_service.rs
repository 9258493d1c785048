use anyhow::Result;
use lsp_types::*;
use tokio::sync::Mutex;
use tracing::debug;

use crate::model::entities::Document;
use crate::sdk::workspace_manager::WorkspaceManager;
use crate::utils::position::{is_before, range_contains};

/// Source of a document's symbol outline
#[async_trait::async_trait]
pub trait SymbolProvider: Send + Sync {
    /// Top-level symbols of the document, children nested.
    ///
    /// An empty list means the provider has nothing for this document.
    async fn document_symbols(&self, document: &Document) -> Result<Vec<DocumentSymbol>>;

    /// Release any resources (server processes) held by the provider
    async fn shutdown(&self) {}
}

/// LSP-based implementation of SymbolProvider
#[derive(Debug)]
pub struct LspSymbolProvider {
    workspace_manager: Mutex<WorkspaceManager>,
}

impl LspSymbolProvider {
    pub fn new(workspace_manager: WorkspaceManager) -> Self {
        Self {
            workspace_manager: Mutex::new(workspace_manager),
        }
    }
}

#[async_trait::async_trait]
impl SymbolProvider for LspSymbolProvider {
    async fn document_symbols(&self, document: &Document) -> Result<Vec<DocumentSymbol>> {
        let mut workspace_manager = self.workspace_manager.lock().await;
        let Some(client) = workspace_manager.client_for_document(document).await? else {
            return Ok(Vec::new());
        };
        let uri = workspace_manager.open_document(&client, document).await?;
        let timeout = workspace_manager.request_timeout();
        drop(workspace_manager);

        let params = DocumentSymbolParams {
            text_document: TextDocumentIdentifier { uri },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        };

        let response = tokio::time::timeout(timeout, client.document_symbols(params))
            .await
            .map_err(|elapsed| {
                anyhow::anyhow!(
                    "{} did not answer documentSymbol: {}",
                    client.server_name(),
                    elapsed
                )
            })??;

        let symbols = response.map(into_symbol_tree).unwrap_or_default();
        debug!("{} returned {} top-level symbols", client.server_name(), symbols.len());
        Ok(symbols)
    }

    async fn shutdown(&self) {
        self.workspace_manager.lock().await.shutdown().await;
    }
}

/// Normalize either response shape into a nested tree
pub fn into_symbol_tree(response: DocumentSymbolResponse) -> Vec<DocumentSymbol> {
    match response {
        DocumentSymbolResponse::Nested(symbols) => symbols,
        DocumentSymbolResponse::Flat(symbols) => nest_flat_symbols(symbols),
    }
}

/// Rebuild nesting for a flat `SymbolInformation` list from range containment.
///
/// Flat symbols carry no detail string, so C/C++ labels fall back to `name()`.
#[allow(deprecated)]
pub fn nest_flat_symbols(mut symbols: Vec<SymbolInformation>) -> Vec<DocumentSymbol> {
    // Outer symbols sort before the symbols they contain
    symbols.sort_by(|a, b| {
        let (ra, rb) = (a.location.range, b.location.range);
        (ra.start.line, ra.start.character)
            .cmp(&(rb.start.line, rb.start.character))
            .then_with(|| (rb.end.line, rb.end.character).cmp(&(ra.end.line, ra.end.character)))
    });

    let mut roots = Vec::new();
    for info in symbols {
        let range = info.location.range;
        insert_nested(
            &mut roots,
            DocumentSymbol {
                name: info.name,
                detail: None,
                kind: info.kind,
                tags: info.tags,
                deprecated: info.deprecated,
                range,
                selection_range: range,
                children: None,
            },
        );
    }
    roots
}

fn insert_nested(siblings: &mut Vec<DocumentSymbol>, symbol: DocumentSymbol) {
    if let Some(last) = siblings.last_mut() {
        let contains = range_contains(&last.range, symbol.range.start)
            && range_contains(&last.range, symbol.range.end);
        if contains && is_before(last.range.start, symbol.range.end) {
            insert_nested(last.children.get_or_insert_with(Vec::new), symbol);
            return;
        }
    }
    siblings.push(symbol);
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[allow(deprecated)]
    fn info(name: &str, kind: SymbolKind, start: u32, end: u32) -> SymbolInformation {
        SymbolInformation {
            name: name.to_string(),
            kind,
            tags: None,
            deprecated: None,
            location: Location::new(
                Url::parse("file:///src/bar.cpp").unwrap(),
                Range::new(Position::new(start, 0), Position::new(end, 1)),
            ),
            container_name: None,
        }
    }

    #[test]
    fn test_nest_flat_symbols_rebuilds_tree() {
        // Deliberately out of order
        let flat = vec![
            info("run", SymbolKind::METHOD, 11, 20),
            info("helper", SymbolKind::FUNCTION, 0, 3),
            info("Worker", SymbolKind::CLASS, 5, 30),
            info("stop", SymbolKind::METHOD, 21, 25),
        ];

        let tree = nest_flat_symbols(flat);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].name, "helper");
        assert!(tree[0].children.is_none());
        assert_eq!(tree[1].name, "Worker");
        let children: Vec<&str> = tree[1]
            .children
            .as_ref()
            .unwrap()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(children, vec!["run", "stop"]);
    }

    #[test]
    fn test_into_symbol_tree_keeps_nested_response() {
        let nested = nest_flat_symbols(vec![info("main", SymbolKind::FUNCTION, 0, 4)]);
        let tree = into_symbol_tree(DocumentSymbolResponse::Nested(nested));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].name, "main");
    }
}
