//! Enclosing-function lookup over a document symbol tree.
//!
//! The tree comes from a [`SymbolProvider`]; the walk prefers the deepest
//! function-like symbol containing the position and remembers the symbol that
//! directly encloses it, which supplies the `Class::` / `[Class ...]` scope.

use lsp_types::{DocumentSymbol, Position, SymbolKind};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::model::entities::Document;
use crate::model::types::Language;
use crate::sdk::services::SymbolProvider;
use crate::utils::position::range_contains;

/// First `(` through the last `)` on the same line
static PARAMETER_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*\)").expect("parameter list pattern is valid"));

/// A function-like symbol and the symbol directly enclosing it
#[derive(Debug, Clone, Copy)]
pub struct SymbolMatch<'a> {
    pub symbol: &'a DocumentSymbol,
    pub container: Option<&'a DocumentSymbol>,
}

/// Function, method or constructor
pub fn is_function_like(kind: SymbolKind) -> bool {
    matches!(
        kind,
        SymbolKind::FUNCTION | SymbolKind::METHOD | SymbolKind::CONSTRUCTOR
    )
}

/// Depth-first search for the innermost function-like symbol containing `position`.
///
/// Children are searched before their parent is considered, so a nested
/// function wins over the function around it. Among siblings the first one
/// yielding a match wins.
pub fn find_symbol_with_parent(
    symbols: &[DocumentSymbol],
    position: Position,
) -> Option<SymbolMatch<'_>> {
    find_in(symbols, position, None)
}

fn find_in<'a>(
    symbols: &'a [DocumentSymbol],
    position: Position,
    parent: Option<&'a DocumentSymbol>,
) -> Option<SymbolMatch<'a>> {
    for symbol in symbols {
        if !range_contains(&symbol.range, position) {
            continue;
        }
        if let Some(children) = symbol.children.as_deref().filter(|c| !c.is_empty()) {
            if let Some(found) = find_in(children, position, Some(symbol)) {
                return Some(found);
            }
        }
        if is_function_like(symbol.kind) {
            return Some(SymbolMatch {
                symbol,
                container: parent,
            });
        }
    }
    None
}

/// Format the `:<name>` label for a match in the given language
pub fn format_function_label(found: &SymbolMatch<'_>, language: Language) -> String {
    let symbol = found.symbol;
    let mut name = symbol.name.clone();

    if language.is_c_family() {
        if let Some(detail) = symbol.detail.as_deref() {
            if detail.starts_with('(') {
                name.push_str(detail);
            } else if let Some(params) = PARAMETER_LIST.find(detail) {
                name.push_str(params.as_str());
            }
        }

        if let Some(container) = found
            .container
            .filter(|c| matches!(c.kind, SymbolKind::CLASS | SymbolKind::STRUCT))
        {
            name = format!("{}::{}", container.name, name);
        }
    } else if language.is_objective_c_family() {
        if let Some(container) = found
            .container
            .filter(|c| matches!(c.kind, SymbolKind::CLASS | SymbolKind::INTERFACE))
        {
            return format!(":[{} {}]", container.name, name);
        }
    }

    if !name.contains('(') && !language.is_objective_c_family() {
        name.push_str("()");
    }

    format!(":{name}")
}

/// Resolve the enclosing function label for `position`, or an empty string.
///
/// Provider failures and empty outlines degrade to an empty label so the rest
/// of the reference is still produced.
pub async fn resolve_function_label(
    provider: &dyn SymbolProvider,
    document: &Document,
    position: Position,
) -> String {
    let symbols = match provider.document_symbols(document).await {
        Ok(symbols) => symbols,
        Err(e) => {
            warn!("Symbol lookup failed: {:#}", e);
            return String::new();
        }
    };

    if symbols.is_empty() {
        debug!("No symbols for document");
        return String::new();
    }

    // Server ranges count UTF-16 code units
    let position = document.to_utf16_position(position);
    let Some(found) = find_symbol_with_parent(&symbols, position) else {
        debug!(
            "No function-like symbol contains {}:{}",
            position.line, position.character
        );
        return String::new();
    };

    format_function_label(&found, document.language())
}
