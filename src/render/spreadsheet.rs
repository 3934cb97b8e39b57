//! Spreadsheet export cells.
//!
//! Spreadsheet formats cap the number of distinct cell formats, so cells do
//! not carry their own style. Each visual combination is interned once and
//! cells refer to it by index into the `cellXfs` table of the styles part.
//! Index 0 is the workbook default and the fallback once the cap is hit.

use quick_xml::events::{BytesDecl, Event};
use quick_xml::Writer;
use serde::Serialize;
use std::io::Cursor;

use super::cache::StyleCache;
use crate::color::Rgb;
use crate::engine::StyleEngine;
use crate::error::Result;
use crate::pipeline::CellContext;
use crate::types::{Alignment, Field, StyleResult};

const SPREADSHEETML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Built-in number format `0%`.
pub const NUMFMT_PERCENT: u32 = 9;
/// Built-in number format `#,##0`.
pub const NUMFMT_THOUSANDS: u32 = 3;

/// Everything that makes two export cells look different.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StyleKey {
    pub background: Option<Rgb>,
    pub foreground: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
    pub percent: bool,
    pub large_number: bool,
    pub alignment: Alignment,
}

impl StyleKey {
    pub fn new(style: &StyleResult, field: &Field) -> Self {
        Self {
            background: style.background,
            foreground: style.foreground,
            bold: style.bold,
            italic: style.italic,
            percent: field.percent_digits().is_some(),
            large_number: field.is_large_number(),
            alignment: Alignment::for_field(field),
        }
    }

    /// Built-in number format of the record; grouping wins over percent.
    pub const fn num_fmt_id(&self) -> u32 {
        if self.large_number {
            NUMFMT_THOUSANDS
        } else if self.percent {
            NUMFMT_PERCENT
        } else {
            0
        }
    }
}

/// A cell ready for the sheet writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportCell {
    pub text: String,
    pub style_index: u32,
}

/// Per-export style interner. Create one per export run.
#[derive(Debug, Clone)]
pub struct SpreadsheetStyler {
    cache: StyleCache<StyleKey>,
    overflowed: bool,
}

impl SpreadsheetStyler {
    /// `max_styles` counts the default record at index 0.
    pub fn new(max_styles: usize) -> Self {
        Self {
            cache: StyleCache::new(max_styles.saturating_sub(1)),
            overflowed: false,
        }
    }

    /// Styler capped at the engine's configured limit.
    pub fn for_engine(engine: &StyleEngine) -> Self {
        Self::new(engine.config().max_cell_styles)
    }

    /// Style one cell and resolve its style index.
    pub fn style_cell(&mut self, engine: &StyleEngine, cell: &CellContext<'_>) -> ExportCell {
        let styled = engine.compute_style(cell);
        let key = StyleKey::new(&styled.style, cell.field);
        ExportCell {
            text: styled.text,
            style_index: self.index_of(&key),
        }
    }

    /// Index for a key, interning it if possible.
    pub fn index_of(&mut self, key: &StyleKey) -> u32 {
        match self.cache.intern(key) {
            Some(i) => i + 1,
            None => {
                if !self.overflowed {
                    self.overflowed = true;
                    tracing::warn!(
                        limit = self.cache.capacity() + 1,
                        "cell style limit reached; further styles use the default"
                    );
                }
                0
            }
        }
    }

    /// Style every cell of the engine's bound table.
    pub fn style_table(&mut self, engine: &StyleEngine) -> Vec<Vec<ExportCell>> {
        let Some(table) = engine.store().dataset() else {
            return Vec::new();
        };
        let groups = engine.selected_groups();
        let mut rows = Vec::with_capacity(table.row_count());
        for row in 0..table.row_count() {
            let key = table.grouping_key(row);
            let mut cells = Vec::with_capacity(table.column_count());
            for col in 0..table.column_count() {
                let Some(field) = table.field_at(col) else {
                    cells.push(ExportCell {
                        text: String::new(),
                        style_index: 0,
                    });
                    continue;
                };
                let cell = CellContext::new(row, field, table.value_at(row, col))
                    .selected(table.is_selected(row))
                    .grouped(key.as_deref(), Some(&groups));
                cells.push(self.style_cell(engine, &cell));
            }
            rows.push(cells);
        }
        rows
    }

    /// Distinct interned styles, not counting the default.
    pub fn style_count(&self) -> usize {
        self.cache.len()
    }

    pub fn records(&self) -> &[StyleKey] {
        self.cache.records()
    }

    /// Whether any cell fell back to the default because of the cap.
    pub const fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Reset between export runs.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.overflowed = false;
    }

    /// Write the interned records as a SpreadsheetML styles part.
    ///
    /// Fonts and fills are deduplicated. Record `i` of [`Self::records`]
    /// becomes `cellXfs` entry `i + 1`.
    ///
    /// # Errors
    /// `Xml` if writing fails.
    pub fn styles_xml(&self) -> Result<String> {
        let records = self.cache.records();

        let mut fonts: StyleCache<(Option<Rgb>, bool, bool)> = StyleCache::new(usize::MAX);
        // fill ids 0 and 1 are reserved for the `none` and `gray125` patterns
        let mut solids: StyleCache<Rgb> = StyleCache::new(usize::MAX);
        fonts.intern(&(None, false, false));

        let mut xfs = Vec::with_capacity(records.len());
        for key in records {
            let font = fonts
                .intern(&(key.foreground, key.bold, key.italic))
                .unwrap_or(0);
            let fill = key
                .background
                .and_then(|bg| solids.intern(&bg))
                .map_or(0, |i| i + 2);
            xfs.push((key, font, fill));
        }

        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        writer
            .create_element("styleSheet")
            .with_attribute(("xmlns", SPREADSHEETML_NS))
            .write_inner_content::<_, quick_xml::Error>(|w| {
                let count = fonts.len().to_string();
                w.create_element("fonts")
                    .with_attribute(("count", count.as_str()))
                    .write_inner_content::<_, quick_xml::Error>(|w| {
                        for (fg, bold, italic) in fonts.records() {
                            w.create_element("font").write_inner_content::<_, quick_xml::Error>(|w| {
                                if *bold {
                                    w.create_element("b").write_empty()?;
                                }
                                if *italic {
                                    w.create_element("i").write_empty()?;
                                }
                                w.create_element("sz")
                                    .with_attribute(("val", "11"))
                                    .write_empty()?;
                                if let Some(fg) = fg {
                                    w.create_element("color")
                                        .with_attribute(("rgb", fg.to_argb().as_str()))
                                        .write_empty()?;
                                }
                                w.create_element("name")
                                    .with_attribute(("val", "Calibri"))
                                    .write_empty()?;
                                Ok(())
                            })?;
                        }
                        Ok(())
                    })?;

                let count = (solids.len() + 2).to_string();
                w.create_element("fills")
                    .with_attribute(("count", count.as_str()))
                    .write_inner_content::<_, quick_xml::Error>(|w| {
                        for pattern in ["none", "gray125"] {
                            w.create_element("fill").write_inner_content::<_, quick_xml::Error>(|w| {
                                w.create_element("patternFill")
                                    .with_attribute(("patternType", pattern))
                                    .write_empty()?;
                                Ok(())
                            })?;
                        }
                        for bg in solids.records() {
                            w.create_element("fill").write_inner_content::<_, quick_xml::Error>(|w| {
                                w.create_element("patternFill")
                                    .with_attribute(("patternType", "solid"))
                                    .write_inner_content::<_, quick_xml::Error>(|w| {
                                        w.create_element("fgColor")
                                            .with_attribute(("rgb", bg.to_argb().as_str()))
                                            .write_empty()?;
                                        w.create_element("bgColor")
                                            .with_attribute(("indexed", "64"))
                                            .write_empty()?;
                                        Ok(())
                                    })?;
                                Ok(())
                            })?;
                        }
                        Ok(())
                    })?;

                w.create_element("borders")
                    .with_attribute(("count", "1"))
                    .write_inner_content::<_, quick_xml::Error>(|w| {
                        w.create_element("border").write_inner_content::<_, quick_xml::Error>(|w| {
                            for side in ["left", "right", "top", "bottom", "diagonal"] {
                                w.create_element(side).write_empty()?;
                            }
                            Ok(())
                        })?;
                        Ok(())
                    })?;

                w.create_element("cellStyleXfs")
                    .with_attribute(("count", "1"))
                    .write_inner_content::<_, quick_xml::Error>(|w| {
                        default_xf(w)?;
                        Ok(())
                    })?;

                let count = (xfs.len() + 1).to_string();
                w.create_element("cellXfs")
                    .with_attribute(("count", count.as_str()))
                    .write_inner_content::<_, quick_xml::Error>(|w| {
                        default_xf(w)?;
                        for (key, font, fill) in &xfs {
                            let num_fmt = key.num_fmt_id().to_string();
                            let font = font.to_string();
                            let fill = fill.to_string();
                            let mut xf = w
                                .create_element("xf")
                                .with_attribute(("numFmtId", num_fmt.as_str()))
                                .with_attribute(("fontId", font.as_str()))
                                .with_attribute(("fillId", fill.as_str()))
                                .with_attribute(("borderId", "0"))
                                .with_attribute(("xfId", "0"));
                            if key.num_fmt_id() != 0 {
                                xf = xf.with_attribute(("applyNumberFormat", "1"));
                            }
                            if key.background.is_some() {
                                xf = xf.with_attribute(("applyFill", "1"));
                            }
                            xf.with_attribute(("applyFont", "1"))
                                .with_attribute(("applyAlignment", "1"))
                                .write_inner_content::<_, quick_xml::Error>(|w| {
                                    w.create_element("alignment")
                                        .with_attribute(("horizontal", key.alignment.as_str()))
                                        .write_empty()?;
                                    Ok(())
                                })?;
                        }
                        Ok(())
                    })?;
                Ok(())
            })?;

        Ok(String::from_utf8(writer.into_inner().into_inner())?)
    }
}

fn default_xf(w: &mut Writer<Cursor<Vec<u8>>>) -> quick_xml::Result<()> {
    w.create_element("xf")
        .with_attribute(("numFmtId", "0"))
        .with_attribute(("fontId", "0"))
        .with_attribute(("fillId", "0"))
        .with_attribute(("borderId", "0"))
        .write_empty()?;
    Ok(())
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
    use crate::types::{FieldType, FormatTag, Value};

    #[test]
    fn test_same_look_same_index() {
        let engine = StyleEngine::default();
        let mut styler = SpreadsheetStyler::for_engine(&engine);
        let field = Field::new("gene", FieldType::Text);
        let a = Value::from("TP53");
        let b = Value::from("BRCA2");
        let first = styler.style_cell(&engine, &CellContext::new(0, &field, Some(&a)));
        let second = styler.style_cell(&engine, &CellContext::new(2, &field, Some(&b)));
        let odd = styler.style_cell(&engine, &CellContext::new(1, &field, Some(&a)));
        assert_eq!(first.style_index, second.style_index);
        assert_ne!(first.style_index, odd.style_index);
        assert_eq!(styler.style_count(), 2);
    }

    #[test]
    fn test_num_fmt_ids() {
        let style = StyleResult::default();
        let pct = Field::new("af", FieldType::Double).with_tag(FormatTag::Percent0);
        let long = Field::new("position", FieldType::Long);
        assert_eq!(StyleKey::new(&style, &pct).num_fmt_id(), NUMFMT_PERCENT);
        assert_eq!(StyleKey::new(&style, &long).num_fmt_id(), NUMFMT_THOUSANDS);
        let long_pct = long.with_tag(FormatTag::Percent2);
        assert_eq!(StyleKey::new(&style, &long_pct).num_fmt_id(), NUMFMT_THOUSANDS);
    }

    #[test]
    fn test_cap_falls_back_to_default() {
        let engine = StyleEngine::default();
        let mut styler = SpreadsheetStyler::new(2);
        let field = Field::new("gene", FieldType::Text);
        let even = styler.style_cell(&engine, &CellContext::new(0, &field, None));
        let odd = styler.style_cell(&engine, &CellContext::new(1, &field, None));
        assert_eq!(even.style_index, 1);
        assert_eq!(odd.style_index, 0);
        assert!(styler.overflowed());
        styler.clear();
        assert_eq!(styler.style_count(), 0);
        assert!(!styler.overflowed());
    }

    #[test]
    fn test_styles_xml() {
        let engine = StyleEngine::default();
        let mut styler = SpreadsheetStyler::for_engine(&engine);
        let field = Field::new("af", FieldType::Double).with_tag(FormatTag::Percent2);
        let v = Value::Double(0.5);
        styler.style_cell(&engine, &CellContext::new(0, &field, Some(&v)));
        let xml = styler.styles_xml().unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(r#"<cellXfs count="2">"#));
        assert!(xml.contains(r#"numFmtId="9""#));
        assert!(xml.contains(r#"<fgColor rgb="FFFFE0B2"/>"#));
        assert!(xml.contains(r#"horizontal="right""#));
    }
}
