use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::model::entities::{EditorState, Selection};
use crate::model::types::{LookupStrategy, ReferenceOptions};
use crate::sdk::services::SymbolProvider;
use crate::sdk::symbol_resolver::resolve_function_label;

/// Optional visibility, optional `static`, a return type, then `name(`
static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\b(?:public|private)?\s*(?:static)?\s*\w+\s+(\w+)\s*\(")
        .expect("declaration pattern is valid")
});

/// Builds `file[:line[-line]][:function]` references for the active editor
pub struct ReferenceBuilder<'a> {
    symbol_provider: &'a dyn SymbolProvider,
}

impl<'a> ReferenceBuilder<'a> {
    pub fn new(symbol_provider: &'a dyn SymbolProvider) -> Self {
        Self { symbol_provider }
    }

    /// Build the reference; empty when there is no active, saved document
    pub async fn build(&self, editor: Option<&EditorState>, options: ReferenceOptions) -> String {
        let Some(editor) = editor else {
            debug!("No active editor");
            return String::new();
        };
        let document = &editor.document;
        if document.is_untitled() {
            debug!("Active document has never been saved");
            return String::new();
        }
        let Some(file_name) = document.file_name() else {
            debug!("Document path is not valid UTF-8");
            return String::new();
        };

        let mut output = file_name.to_string();

        if options.include_line {
            output.push_str(&line_part(&editor.selection));
        }

        if options.include_function {
            let function_part = match document.language().lookup_strategy() {
                LookupStrategy::LineScan => line_scan_label(editor),
                LookupStrategy::SymbolProvider => {
                    resolve_function_label(self.symbol_provider, document, editor.selection.active)
                        .await
                }
                LookupStrategy::None => String::new(),
            };
            output.push_str(&function_part);
        }

        output
    }
}

/// `:<line>` for a caret or single-line selection, `:<start>-<end>` otherwise (1-based)
pub fn line_part(selection: &Selection) -> String {
    if selection.is_empty() {
        return format!(":{}", selection.active.line + 1);
    }
    let start = selection.start().line + 1;
    let end = selection.end().line + 1;
    if start == end {
        format!(":{start}")
    } else {
        format!(":{start}-{end}")
    }
}

/// First declared function name in `text`, scanning line by line
pub fn scan_function_name(text: &str) -> Option<&str> {
    text.split('\n').find_map(|line| {
        DECLARATION
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|name| name.as_str())
    })
}

/// Label from the selected text, or from the active line when nothing is selected
fn line_scan_label(editor: &EditorState) -> String {
    let document = &editor.document;
    let mut text = document.text_in(editor.selection.range());
    if text.is_empty() {
        text = document.line_text(editor.selection.active.line).to_string();
    }

    scan_function_name(&text)
        .map(|name| format!(":{name}()"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entities::Document;
    use crate::model::types::ReferenceCommand;
    use crate::sdk::services::tests::{FailingSymbolProvider, StaticSymbolProvider};
    use lsp_types::{DocumentSymbol, Position, Range, SymbolKind};

    const FOO_JAVA: &str = "package demo;\n\
        \n\
        public class Foo {\n\
        \x20   private int count;\n\
        \n\
        \x20   public static Foo create() {\n\
        \x20       return new Foo();\n\
        \x20   }\n\
        \n\
        \x20   public void doWork(int x) {\n\
        \x20       count += x;\n\
        \x20   }\n\
        }\n";

    fn editor(document: Document, anchor: (u32, u32), active: (u32, u32)) -> EditorState {
        EditorState::new(
            document,
            Selection::new(
                Position::new(anchor.0, anchor.1),
                Position::new(active.0, active.1),
            ),
        )
    }

    fn java(anchor: (u32, u32), active: (u32, u32)) -> EditorState {
        editor(Document::new("/work/src/demo/Foo.java", "java", FOO_JAVA), anchor, active)
    }

    async fn build(editor: Option<&EditorState>, command: ReferenceCommand) -> String {
        ReferenceBuilder::new(&FailingSymbolProvider)
            .build(editor, command.options())
            .await
    }

    #[allow(deprecated)]
    fn worker_symbols() -> Vec<DocumentSymbol> {
        let method = DocumentSymbol {
            name: "run".to_string(),
            detail: Some("(int, int)".to_string()),
            kind: SymbolKind::METHOD,
            tags: None,
            deprecated: None,
            range: Range::new(Position::new(4, 4), Position::new(8, 5)),
            selection_range: Range::new(Position::new(4, 9), Position::new(4, 12)),
            children: None,
        };
        vec![DocumentSymbol {
            name: "Worker".to_string(),
            detail: None,
            kind: SymbolKind::CLASS,
            tags: None,
            deprecated: None,
            range: Range::new(Position::new(2, 0), Position::new(10, 2)),
            selection_range: Range::new(Position::new(2, 6), Position::new(2, 12)),
            children: Some(vec![method]),
        }]
    }

    #[test]
    fn test_line_part_caret() {
        let sel = Selection::caret(Position::new(9, 4));
        assert_eq!(line_part(&sel), ":10");
    }

    #[test]
    fn test_line_part_same_line_selection() {
        let sel = Selection::new(Position::new(3, 1), Position::new(3, 12));
        assert_eq!(line_part(&sel), ":4");
    }

    #[test]
    fn test_line_part_multi_line_selection_either_direction() {
        let down = Selection::new(Position::new(2, 0), Position::new(6, 3));
        let up = Selection::new(Position::new(6, 3), Position::new(2, 0));
        assert_eq!(line_part(&down), ":3-7");
        assert_eq!(line_part(&up), ":3-7");
    }

    #[test]
    fn test_scan_function_name() {
        assert_eq!(scan_function_name("public void doWork(int x) {"), Some("doWork"));
        assert_eq!(scan_function_name("    public static Foo create() {"), Some("create"));
        assert_eq!(scan_function_name("private static int max (int a, int b)"), Some("max"));
        assert_eq!(scan_function_name("String name(){"), Some("name"));
        assert_eq!(scan_function_name("count += x;"), None);
        assert_eq!(scan_function_name("doWork(3);"), None);
    }

    #[test]
    fn test_scan_takes_first_matching_line() {
        let text = "int a;\nvoid first() {}\nvoid second() {}";
        assert_eq!(scan_function_name(text), Some("first"));
    }

    #[tokio::test]
    async fn test_no_editor_yields_empty() {
        assert_eq!(build(None, ReferenceCommand::CopyFileLineFunction).await, "");
    }

    #[tokio::test]
    async fn test_untitled_document_yields_empty() {
        let state = editor(Document::untitled("java", FOO_JAVA), (9, 0), (9, 0));
        assert_eq!(build(Some(&state), ReferenceCommand::CopyFileLine).await, "");
    }

    #[tokio::test]
    async fn test_java_line_and_function() {
        let state = java((9, 4), (9, 4));
        assert_eq!(
            build(Some(&state), ReferenceCommand::CopyFileLineFunction).await,
            "Foo.java:10:doWork()"
        );
    }

    #[tokio::test]
    async fn test_java_function_only() {
        let state = java((5, 0), (5, 0));
        assert_eq!(
            build(Some(&state), ReferenceCommand::CopyFileFunction).await,
            "Foo.java:create()"
        );
    }

    #[tokio::test]
    async fn test_java_multi_line_selection_scans_selected_text() {
        // Lines 4..=10 cover `create` first, then `doWork`
        let state = java((4, 0), (10, 0));
        assert_eq!(
            build(Some(&state), ReferenceCommand::CopyFileLineFunction).await,
            "Foo.java:5-11:create()"
        );
    }

    #[tokio::test]
    async fn test_java_selection_inside_body_has_no_function() {
        let state = java((10, 8), (10, 18));
        assert_eq!(
            build(Some(&state), ReferenceCommand::CopyFileLineFunction).await,
            "Foo.java:11"
        );
    }

    #[tokio::test]
    async fn test_line_only_never_consults_provider() {
        let provider = StaticSymbolProvider::new(worker_symbols());
        let state = editor(Document::new("/src/bar.cpp", "cpp", ""), (5, 0), (5, 0));

        let reference = ReferenceBuilder::new(&provider)
            .build(Some(&state), ReferenceCommand::CopyFileLine.options())
            .await;

        assert_eq!(reference, "bar.cpp:6");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_cpp_uses_symbol_provider_at_active_position() {
        let provider = StaticSymbolProvider::new(worker_symbols());
        // Anchor outside the method, caret inside it
        let state = editor(Document::new("/src/bar.cpp", "cpp", ""), (0, 0), (6, 2));

        let reference = ReferenceBuilder::new(&provider)
            .build(Some(&state), ReferenceCommand::CopyFileLineFunction.options())
            .await;

        assert_eq!(reference, "bar.cpp:1-7:Worker::run(int, int)");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_cpp_provider_failure_keeps_line_part() {
        let state = editor(Document::new("/src/bar.cpp", "cpp", ""), (6, 2), (6, 2));
        assert_eq!(
            build(Some(&state), ReferenceCommand::CopyFileLineFunction).await,
            "bar.cpp:7"
        );
    }

    #[tokio::test]
    async fn test_other_language_has_no_function_part() {
        let provider = StaticSymbolProvider::new(worker_symbols());
        let state = editor(
            Document::new("/src/lib.rs", "rust", "pub fn run() {}"),
            (0, 3),
            (0, 3),
        );

        let reference = ReferenceBuilder::new(&provider)
            .build(Some(&state), ReferenceCommand::CopyFileFunction.options())
            .await;

        assert_eq!(reference, "lib.rs");
        assert_eq!(provider.calls(), 0);
    }
}
