//! End-to-end copy command scenarios against in-memory hosts.

use anyhow::Result;
use async_trait::async_trait;
use file_line_reference::{
    Clipboard, ClipboardError, Document, EditorState, FileLineReference, ReferenceCommand,
    Selection, StatusSink, SymbolProvider,
};
use lsp_types::{DocumentSymbol, Position, Range, SymbolKind};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct MemoryClipboard {
    text: Mutex<Option<String>>,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.text.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct MemoryStatus {
    shown: Mutex<Vec<(String, Duration)>>,
}

impl StatusSink for MemoryStatus {
    fn show(&self, message: &str, timeout: Duration) {
        self.shown.lock().unwrap().push((message.to_string(), timeout));
    }
}

struct Outline(Vec<DocumentSymbol>);

#[async_trait]
impl SymbolProvider for Outline {
    async fn document_symbols(&self, _document: &Document) -> Result<Vec<DocumentSymbol>> {
        Ok(self.0.clone())
    }
}

#[allow(deprecated)]
fn symbol(
    name: &str,
    detail: Option<&str>,
    kind: SymbolKind,
    lines: (u32, u32),
    children: Vec<DocumentSymbol>,
) -> DocumentSymbol {
    let range = Range::new(Position::new(lines.0, 0), Position::new(lines.1, 1));
    DocumentSymbol {
        name: name.to_string(),
        detail: detail.map(str::to_string),
        kind,
        tags: None,
        deprecated: None,
        range,
        selection_range: range,
        children: (!children.is_empty()).then_some(children),
    }
}

struct Harness {
    copier: FileLineReference,
    clipboard: Arc<MemoryClipboard>,
    status: Arc<MemoryStatus>,
}

impl Harness {
    fn new(symbols: Vec<DocumentSymbol>) -> Self {
        let clipboard = Arc::new(MemoryClipboard::default());
        let status = Arc::new(MemoryStatus::default());
        let copier = FileLineReference::builder()
            .symbol_provider(Arc::new(Outline(symbols)))
            .clipboard(clipboard.clone())
            .status(status.clone())
            .build()
            .unwrap();
        Self {
            copier,
            clipboard,
            status,
        }
    }

    async fn run(&self, command: ReferenceCommand, editor: Option<&EditorState>) -> Option<String> {
        self.copier.execute(command, editor).await.unwrap()
    }

    fn clipboard(&self) -> Option<String> {
        self.clipboard.text.lock().unwrap().clone()
    }
}

const FOO_JAVA: &str = "\
package demo;

public class Foo {
    private int count;

    public void doWork(int x) {
        count += x;
    }
}
";

const BAR_CPP: &str = "\
#include <cstdio>

class Worker {
public:
    int run(int a, int b) {
        int total = a + b;
        std::printf(\"%d\", total);
        return total;
    }
};
";

fn caret(document: Document, line: u32, character: u32) -> EditorState {
    EditorState::new(document, Selection::caret(Position::new(line, character)))
}

fn worker_outline() -> Vec<DocumentSymbol> {
    vec![symbol(
        "Worker",
        None,
        SymbolKind::CLASS,
        (2, 9),
        vec![symbol("run", Some("int (int, int)"), SymbolKind::METHOD, (4, 8), vec![])],
    )]
}

#[tokio::test]
async fn test_java_caret_on_declaration() {
    let harness = Harness::new(vec![]);
    let editor = caret(Document::new("/work/src/Foo.java", "java", FOO_JAVA), 5, 4);

    let copied = harness
        .run(ReferenceCommand::CopyFileLineFunction, Some(&editor))
        .await;

    assert_eq!(copied.as_deref(), Some("Foo.java:6:doWork()"));
    assert_eq!(harness.clipboard().as_deref(), Some("Foo.java:6:doWork()"));
    assert_eq!(
        *harness.status.shown.lock().unwrap(),
        vec![(
            "\"Foo.java:6:doWork()\" copied".to_string(),
            Duration::from_millis(3000)
        )]
    );
}

#[tokio::test]
async fn test_cpp_selection_with_method_detail() {
    let harness = Harness::new(worker_outline());
    let editor = EditorState::new(
        Document::new("/work/src/bar.cpp", "cpp", BAR_CPP),
        Selection::new(Position::new(4, 4), Position::new(6, 8)),
    );

    let copied = harness
        .run(ReferenceCommand::CopyFileLineFunction, Some(&editor))
        .await;

    assert_eq!(copied.as_deref(), Some("bar.cpp:5-7:Worker::run(int, int)"));
}

#[tokio::test]
async fn test_c_free_function_gets_parentheses() {
    let harness = Harness::new(vec![symbol(
        "main",
        None,
        SymbolKind::FUNCTION,
        (0, 3),
        vec![],
    )]);
    let text = "int main(void) {\n  return 0;\n}\n";
    let editor = caret(Document::new("C:\\src\\main.c", "c", text), 1, 2);

    let copied = harness
        .run(ReferenceCommand::CopyFileFunction, Some(&editor))
        .await;

    assert_eq!(copied.as_deref(), Some("main.c:main()"));
}

#[tokio::test]
async fn test_objective_c_method_in_interface() {
    let outline = vec![symbol(
        "Greeter",
        None,
        SymbolKind::CLASS,
        (0, 10),
        vec![symbol("sayHello:", None, SymbolKind::METHOD, (2, 5), vec![])],
    )];
    let harness = Harness::new(outline);
    let editor = caret(Document::new("/work/Greeter.m", "objective-c", ""), 3, 0);

    let copied = harness
        .run(ReferenceCommand::CopyFileLineFunction, Some(&editor))
        .await;

    assert_eq!(copied.as_deref(), Some("Greeter.m:4:[Greeter sayHello:]"));
}

#[tokio::test]
async fn test_caret_outside_every_function() {
    let harness = Harness::new(worker_outline());
    let editor = caret(Document::new("/work/src/bar.cpp", "cpp", BAR_CPP), 0, 0);

    let copied = harness
        .run(ReferenceCommand::CopyFileLineFunction, Some(&editor))
        .await;

    assert_eq!(copied.as_deref(), Some("bar.cpp:1"));
}

#[tokio::test]
async fn test_no_active_editor_copies_nothing() {
    let harness = Harness::new(worker_outline());

    for command in [
        ReferenceCommand::CopyFileLine,
        ReferenceCommand::CopyFileFunction,
        ReferenceCommand::CopyFileLineFunction,
    ] {
        assert_eq!(harness.run(command, None).await, None);
    }

    assert_eq!(harness.clipboard(), None);
    assert!(harness.status.shown.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unsaved_document_copies_nothing() {
    let harness = Harness::new(vec![]);
    let editor = caret(Document::untitled("java", FOO_JAVA), 5, 4);

    assert_eq!(
        harness
            .run(ReferenceCommand::CopyFileLineFunction, Some(&editor))
            .await,
        None
    );
    assert_eq!(harness.clipboard(), None);
}

#[tokio::test]
async fn test_plain_text_only_gets_file_and_line() {
    let harness = Harness::new(worker_outline());
    let editor = EditorState::new(
        Document::new("/notes/todo.md", "markdown", "- a\n- b\n- c\n"),
        Selection::new(Position::new(2, 3), Position::new(0, 0)),
    );

    assert_eq!(
        harness
            .run(ReferenceCommand::CopyFileLineFunction, Some(&editor))
            .await
            .as_deref(),
        Some("todo.md:1-3")
    );
    assert_eq!(
        harness
            .run(ReferenceCommand::CopyFileFunction, Some(&editor))
            .await
            .as_deref(),
        Some("todo.md")
    );
}
