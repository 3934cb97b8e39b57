//! Multi-line cells with word wrapping.
//!
//! Each cell wraps independently; [`RowHeights`] keeps the tallest cell per
//! row so every cell of the row can be drawn at the same height.

use serde::Serialize;
use std::collections::HashMap;

use crate::engine::StyleEngine;
use crate::pipeline::CellContext;
use crate::types::StyleResult;

/// A styled cell split into display lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrappedCell {
    pub lines: Vec<String>,
    pub style: StyleResult,
}

impl WrappedCell {
    pub fn line_count(&self) -> usize {
        self.lines.len().max(1)
    }
}

/// Greedy word wrap at `width` characters. Words longer than the width are
/// split; explicit newlines are kept, so a blank paragraph is an empty line.
/// A width of 0 disables wrapping.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return text.split('\n').map(str::to_string).collect();
    }
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let first = lines.len();
        let mut current = String::new();
        let mut current_len = 0;
        for word in paragraph.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();
            while chars.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = chars.split_off(width);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }
            let word_len = chars.len();
            if current_len > 0 && current_len + 1 + word_len > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(chars);
            current_len += word_len;
        }
        if current_len > 0 || lines.len() == first {
            lines.push(current);
        }
    }
    lines
}

/// Style a cell and wrap its display text at `width` characters.
pub fn render_wrapped(engine: &StyleEngine, cell: &CellContext<'_>, width: usize) -> WrappedCell {
    let styled = engine.compute_style(cell);
    WrappedCell {
        lines: wrap_text(&styled.text, width),
        style: styled.style,
    }
}

/// Line counts per (row, column); a row is as tall as its tallest cell.
#[derive(Debug, Clone, Default)]
pub struct RowHeights {
    cells: HashMap<usize, HashMap<usize, usize>>,
}

impl RowHeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the line count of one cell, replacing any earlier count.
    pub fn record(&mut self, row: usize, col: usize, lines: usize) {
        self.cells.entry(row).or_default().insert(col, lines.max(1));
    }

    /// Height of `row` in lines; 1 for rows with nothing recorded.
    pub fn row_height(&self, row: usize) -> usize {
        self.cells
            .get(&row)
            .and_then(|cols| cols.values().copied().max())
            .unwrap_or(1)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::{Field, FieldType, Value};

    #[test]
    fn test_wrap_words() {
        assert_eq!(
            wrap_text("missense variant in exon", 10),
            vec!["missense", "variant in", "exon"]
        );
    }

    #[test]
    fn test_wrap_long_word() {
        assert_eq!(wrap_text("ENST00000357654", 6), vec!["ENST00", "000357", "654"]);
    }

    #[test]
    fn test_wrap_empty_and_newlines() {
        assert_eq!(wrap_text("", 8), vec![""]);
        assert_eq!(wrap_text("a\nb", 8), vec!["a", "b"]);
        assert_eq!(wrap_text("a\n\nb", 8), vec!["a", "", "b"]);
        assert_eq!(wrap_text("a\n\nb", 0), vec!["a", "", "b"]);
    }

    #[test]
    fn test_row_height_is_max() {
        let mut heights = RowHeights::new();
        heights.record(0, 0, 1);
        heights.record(0, 1, 3);
        heights.record(0, 2, 2);
        assert_eq!(heights.row_height(0), 3);
        heights.record(0, 1, 1);
        assert_eq!(heights.row_height(0), 2);
        assert_eq!(heights.row_height(9), 1);
    }

    #[test]
    fn test_render_wrapped_matches_label_style() {
        let engine = StyleEngine::default();
        let field = Field::new("consequence", FieldType::Text);
        let value = Value::from("splice region variant");
        let cell = CellContext::new(1, &field, Some(&value));
        let wrapped = render_wrapped(&engine, &cell, 12);
        assert_eq!(wrapped.lines, vec!["splice", "region", "variant"]);
        assert_eq!(wrapped.style, engine.compute_style(&cell).style);
    }
}
