use lsp_types::{Position, Range};

/// Convert 1-based line/character to 0-based LSP Position
pub fn to_lsp_position(line: u32, character: u32) -> Position {
    Position {
        line: line.saturating_sub(1),
        character: character.saturating_sub(1),
    }
}

/// Whether `a` comes strictly before `b` in the document
pub fn is_before(a: Position, b: Position) -> bool {
    (a.line, a.character) < (b.line, b.character)
}

/// Inclusive containment: `start <= position <= end`
pub fn range_contains(range: &Range, position: Position) -> bool {
    !is_before(position, range.start) && !is_before(range.end, position)
}

/// UTF-16 code-unit offset of character column `column` in `line`.
///
/// Columns past the end of the line keep their distance from the line end.
pub fn utf16_column(line: &str, column: u32) -> u32 {
    let mut units = 0;
    let mut chars = line.chars();
    for taken in 0..column {
        match chars.next() {
            Some(c) => units += c.len_utf16() as u32,
            None => return units + (column - taken),
        }
    }
    units
}

/// Slice `line` by character columns; `None` bounds mean line start / line end.
/// Out-of-range columns are clamped.
pub fn to_char_range(line: &str, from: Option<u32>, to: Option<u32>) -> &str {
    let byte_at = |column: u32| {
        line.char_indices()
            .nth(column as usize)
            .map_or(line.len(), |(idx, _)| idx)
    };
    let start = from.map_or(0, byte_at);
    let end = to.map_or(line.len(), byte_at).max(start);
    &line[start..end]
}
