use crate::model::entities::EditorState;
use crate::model::types::{ReferenceCommand, ReferenceOptions};
use crate::sdk::FileLineReferenceBuilder;
use crate::sdk::reference_builder::ReferenceBuilder;
use crate::sdk::services::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// How long the "copied" status message stays visible
pub const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(3);

/// **Copies file/line/function references for the active editor**
///
/// Wires the reference builder to the host collaborators: a symbol provider
/// for C-family function lookup, a clipboard, and a status sink.
///
/// # Examples
/// ```no_run
/// use file_line_reference::{
///     Document, EditorState, FileLineReference, ReferenceCommand, Selection,
/// };
/// use lsp_types::Position;
///
/// # async fn example() -> anyhow::Result<()> {
/// let copier = FileLineReference::builder().build()?;
/// let editor = EditorState::new(
///     Document::new("/src/Foo.java", "java", "public void doWork(int x) {"),
///     Selection::caret(Position::new(0, 4)),
/// );
///
/// let copied = copier.execute(ReferenceCommand::CopyFileLineFunction, Some(&editor)).await?;
/// assert_eq!(copied.as_deref(), Some("Foo.java:1:doWork()"));
/// # Ok(())
/// # }
/// ```
pub struct FileLineReference {
    symbol_provider: Arc<dyn SymbolProvider>,
    clipboard: Arc<dyn Clipboard>,
    status: Arc<dyn StatusSink>,
}

impl std::fmt::Debug for FileLineReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLineReference").finish_non_exhaustive()
    }
}

impl FileLineReference {
    pub fn new(
        symbol_provider: Arc<dyn SymbolProvider>,
        clipboard: Arc<dyn Clipboard>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            symbol_provider,
            clipboard,
            status,
        }
    }

    /// Create a builder for configuring FileLineReference
    pub fn builder() -> FileLineReferenceBuilder {
        FileLineReferenceBuilder::new()
    }

    /// Build the reference text without any side effects
    pub async fn build_reference(
        &self,
        editor: Option<&EditorState>,
        options: ReferenceOptions,
    ) -> String {
        ReferenceBuilder::new(self.symbol_provider.as_ref())
            .build(editor, options)
            .await
    }

    /// Run a copy command.
    ///
    /// Returns the copied text, or `None` when there was nothing to copy; in
    /// that case neither the clipboard nor the status sink is touched.
    pub async fn execute(
        &self,
        command: ReferenceCommand,
        editor: Option<&EditorState>,
    ) -> Result<Option<String>, ClipboardError> {
        let text = self.build_reference(editor, command.options()).await;
        if text.is_empty() {
            debug!("{}: nothing to copy", command);
            return Ok(None);
        }

        self.clipboard.write_text(&text)?;
        self.status
            .show(&format!("\"{text}\" copied"), STATUS_MESSAGE_TIMEOUT);
        info!("{}: copied {}", command, text);
        Ok(Some(text))
    }

    /// File name + line reference
    pub async fn copy_file_line(
        &self,
        editor: Option<&EditorState>,
    ) -> Result<Option<String>, ClipboardError> {
        self.execute(ReferenceCommand::CopyFileLine, editor).await
    }

    /// File name + function reference
    pub async fn copy_file_function(
        &self,
        editor: Option<&EditorState>,
    ) -> Result<Option<String>, ClipboardError> {
        self.execute(ReferenceCommand::CopyFileFunction, editor).await
    }

    /// File name + line + function reference
    pub async fn copy_file_line_function(
        &self,
        editor: Option<&EditorState>,
    ) -> Result<Option<String>, ClipboardError> {
        self.execute(ReferenceCommand::CopyFileLineFunction, editor)
            .await
    }

    /// Stop any language servers started for symbol lookup
    pub async fn shutdown(&self) {
        self.symbol_provider.shutdown().await;
    }
}
