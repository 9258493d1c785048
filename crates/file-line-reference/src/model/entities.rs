use lsp_types::{Position, Range};
use std::path::{Path, PathBuf};

use crate::model::types::Language;
use crate::utils::file::base_file_name;
use crate::utils::position::{is_before, to_char_range, utf16_column};

/// A text document as seen by the active editor.
///
/// A document without a path has never been saved; references are never
/// produced for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: Option<PathBuf>,
    language_id: String,
    text: String,
}

impl Document {
    /// Create a document backed by a file on disk
    pub fn new(
        path: impl Into<PathBuf>,
        language_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            path: Some(path.into()),
            language_id: language_id.into(),
            text: text.into(),
        }
    }

    /// Create a document that has never been saved
    pub fn untitled(language_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: None,
            language_id: language_id.into(),
            text: text.into(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_untitled(&self) -> bool {
        self.path.is_none()
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    pub fn language(&self) -> Language {
        Language::from_id(&self.language_id)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Base file name with any directory components stripped
    pub fn file_name(&self) -> Option<&str> {
        self.path
            .as_deref()
            .and_then(|p| p.to_str())
            .map(base_file_name)
    }

    /// Text of a single line without its line terminator; empty when out of range
    pub fn line_text(&self, line: u32) -> &str {
        self.lines().nth(line as usize).unwrap_or_default()
    }

    /// `position` with its character column re-expressed in UTF-16 code units,
    /// the encoding negotiated with language servers
    pub fn to_utf16_position(&self, position: Position) -> Position {
        let line = self.line_text(position.line);
        Position::new(position.line, utf16_column(line, position.character))
    }

    /// Text covered by `range`, lines joined with `\n`.
    ///
    /// Columns count Unicode scalar values and are clamped to line length.
    pub fn text_in(&self, range: Range) -> String {
        let (start, end) = if is_before(range.end, range.start) {
            (range.end, range.start)
        } else {
            (range.start, range.end)
        };

        let mut selected = Vec::new();
        for (idx, line) in self.lines().enumerate() {
            let idx = idx as u32;
            if idx < start.line {
                continue;
            }
            if idx > end.line {
                break;
            }
            let from = if idx == start.line { Some(start.character) } else { None };
            let to = if idx == end.line { Some(end.character) } else { None };
            selected.push(to_char_range(line, from, to));
        }
        selected.join("\n")
    }

    fn lines(&self) -> impl Iterator<Item = &str> {
        self.text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
    }
}

/// Editor selection: the anchor where it started and the active (caret) end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

impl Selection {
    pub fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    /// An empty selection at `position`
    pub fn caret(position: Position) -> Self {
        Self::new(position, position)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    /// The earlier of anchor and active
    pub fn start(&self) -> Position {
        if is_before(self.active, self.anchor) {
            self.active
        } else {
            self.anchor
        }
    }

    /// The later of anchor and active
    pub fn end(&self) -> Position {
        if is_before(self.active, self.anchor) {
            self.anchor
        } else {
            self.active
        }
    }

    pub fn range(&self) -> Range {
        Range::new(self.start(), self.end())
    }
}

/// Snapshot of the active editor: the open document and its selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    pub document: Document,
    pub selection: Selection,
}

impl EditorState {
    pub fn new(document: Document, selection: Selection) -> Self {
        Self { document, selection }
    }
}
