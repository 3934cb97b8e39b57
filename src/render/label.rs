//! Single-line grid cells.

use serde::Serialize;

use crate::engine::StyleEngine;
use crate::pipeline::CellContext;
use crate::types::{Alignment, StyleResult};

/// A styled single-line cell for an interactive grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCell {
    pub text: String,
    pub style: StyleResult,
    pub alignment: Alignment,
}

impl LabelCell {
    /// Inline CSS declarations for HTML grids.
    pub fn css(&self) -> String {
        let mut css = String::new();
        if let Some(bg) = self.style.background {
            css.push_str(&format!("background-color:{bg};"));
        }
        css.push_str(&format!("color:{};", self.style.foreground_or_default()));
        if self.style.bold {
            css.push_str("font-weight:bold;");
        }
        if self.style.italic {
            css.push_str("font-style:italic;");
        }
        css.push_str(&format!("text-align:{}", self.alignment.as_str()));
        css
    }
}

pub fn render_label(engine: &StyleEngine, cell: &CellContext<'_>) -> LabelCell {
    let styled = engine.compute_style(cell);
    LabelCell {
        text: styled.text,
        style: styled.style,
        alignment: Alignment::for_field(cell.field),
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
    fn test_label_css() {
        let engine = StyleEngine::default();
        let field = Field::new("depth", FieldType::Integer);
        let value = Value::Integer(40);
        let label = render_label(&engine, &CellContext::new(0, &field, Some(&value)).selected(true));
        assert_eq!(label.text, "40");
        assert_eq!(label.alignment, Alignment::Right);
        assert_eq!(
            label.css(),
            "background-color:#3399FF;color:#000000;text-align:right"
        );
    }
}
