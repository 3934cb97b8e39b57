//! Tests for the render adapters
//!
//! ## Spreadsheet export
//! - Style interning: one record per distinct look
//! - Style cap: overflowing cells fall back to the default index 0
//! - styles.xml: fonts, fills and cellXfs written from the interned records
//!
//! ## Surfaces
//! - Label, wrapped and export cells agree on the computed style
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use annostyle::render::{render_label, render_wrapped, RowHeights, SpreadsheetStyler, StyleKey};
use annostyle::{
    CellContext, ComparisonOperator, EngineConfig, Field, HighlightCriterion, MemoryTable,
    Predicate, Rgb, StyleEngine, TableSource, Value,
};
use common::*;
use std::collections::HashSet;
use std::sync::Arc;

/// A table reporting one more column than it has fields for.
struct TrailingBlankColumn(MemoryTable);

impl TableSource for TrailingBlankColumn {
    fn row_count(&self) -> usize {
        self.0.row_count()
    }

    fn column_count(&self) -> usize {
        self.0.column_count() + 1
    }

    fn field_at(&self, col: usize) -> Option<&Field> {
        self.0.field_at(col)
    }

    fn value_at(&self, row: usize, col: usize) -> Option<&Value> {
        self.0.value_at(row, col)
    }

    fn selected_rows(&self) -> Vec<usize> {
        self.0.selected_rows()
    }

    fn grouping_key(&self, row: usize) -> Option<String> {
        self.0.grouping_key(row)
    }
}

fn hundred_rows() -> TableBuilder {
    (0..100).fold(TableBuilder::new(), |builder, i| {
        builder.depth_row(if i % 3 == 0 { "TP53" } else { "ATM" }, i)
    })
}

// ============================================================================
// Interning
// ============================================================================

#[test]
fn test_distinct_looks_intern_once() {
    let engine = hundred_rows().engine();
    let mut styler = SpreadsheetStyler::for_engine(&engine);
    let cells = styler.style_table(&engine);
    assert_eq!(cells.len(), 100);

    // parity x {left text, right number, right percent}
    assert_eq!(styler.style_count(), 6);
    let distinct: HashSet<StyleKey> = styler.records().iter().copied().collect();
    assert_eq!(distinct.len(), 6);

    assert_eq!(cells[0][col("gene")].style_index, cells[2][col("gene")].style_index);
    assert_eq!(
        cells[0][col("depth")].style_index,
        cells[0][col("allele_num")].style_index
    );
    assert_ne!(cells[0][col("depth")].style_index, cells[0][col("af")].style_index);
    assert!(cells.iter().flatten().all(|c| c.style_index > 0));
}

#[test]
fn test_highlights_add_records() {
    let mut engine = hundred_rows().engine();
    engine
        .store_mut()
        .add_highlight(
            HighlightCriterion::cell(depth(), Predicate::compare(ComparisonOperator::Greater, ["90"]))
                .with_background(Rgb::RED)
                .bold(),
        )
        .unwrap();
    let mut styler = SpreadsheetStyler::for_engine(&engine);
    let cells = styler.style_table(&engine);
    assert_eq!(styler.style_count(), 7);
    assert_eq!(cells[95][col("depth")].style_index, cells[99][col("depth")].style_index);
    assert_eq!(cells[95][col("depth")].text, "95");
}

#[test]
fn test_cap_falls_back_to_default_style() {
    let engine = TableBuilder::new()
        .depth_row("TP53", 1)
        .depth_row("ATM", 2)
        .engine();
    let mut styler = SpreadsheetStyler::new(3);
    let cells = styler.style_table(&engine);
    assert_eq!(styler.style_count(), 2);
    assert!(styler.overflowed());
    let indices: Vec<u32> = cells[0].iter().map(|c| c.style_index).collect();
    assert_eq!(indices, vec![1, 2, 0, 2, 1]);
    assert!(cells[1].iter().all(|c| c.style_index == 0));
    assert_eq!(cells[1][col("gene")].text, "ATM");
}

#[test]
fn test_each_export_starts_fresh() {
    let engine = hundred_rows().engine();
    let mut styler = SpreadsheetStyler::for_engine(&engine);
    let first = styler.style_table(&engine);
    styler.clear();
    let second = styler.style_table(&engine);
    assert_eq!(first, second);
}

#[test]
fn test_column_without_field_keeps_grid_rectangular() {
    let mut table = MemoryTable::new(vec![gene(), depth()]);
    table
        .push_row(vec![Some(Value::from("TP53")), Some(Value::Integer(4))])
        .unwrap();
    let engine = StyleEngine::with_dataset(
        EngineConfig::default(),
        Arc::new(TrailingBlankColumn(table)),
    )
    .unwrap();

    let styled = engine.style_table();
    assert_eq!(styled[0].len(), 3);
    assert_eq!(styled[0][1].text, "4");
    assert_eq!(styled[0][2].text, "");
    assert_eq!(styled[0][2].style.background, Some(plain_row(0)));

    let mut styler = SpreadsheetStyler::for_engine(&engine);
    let exported = styler.style_table(&engine);
    assert_eq!(exported[0].len(), 3);
    assert_eq!(exported[0][1].text, "4");
    assert_eq!(exported[0][2].style_index, 0);
}

// ============================================================================
// styles.xml
// ============================================================================

#[test]
fn test_styles_xml_lists_interned_records() {
    let mut engine = hundred_rows().engine();
    engine
        .store_mut()
        .add_highlight(
            HighlightCriterion::cell(gene(), Predicate::compare(ComparisonOperator::Equal, ["tp53"]))
                .with_foreground(Rgb::new(0x1F, 0x4E, 0x79))
                .italic(),
        )
        .unwrap();
    let mut styler = SpreadsheetStyler::for_engine(&engine);
    styler.style_table(&engine);
    let xml = styler.styles_xml().unwrap();

    let xfs = styler.style_count() + 1;
    assert!(xml.contains(&format!(r#"<cellXfs count="{xfs}">"#)), "{xml}");
    assert!(xml.contains(r#"<fonts count="2">"#));
    assert!(xml.contains(r#"<color rgb="FF1F4E79"/>"#));
    assert!(xml.contains("<i/>"));
    assert!(xml.contains(r#"<fills count="4">"#));
    assert!(xml.contains(r#"<patternFill patternType="gray125"/>"#));
    assert!(xml.contains(r#"<fgColor rgb="FFFFF3E0"/>"#));
    assert!(xml.contains(r#"numFmtId="9""#));
    assert!(xml.contains(r#"horizontal="left""#));
}

// ============================================================================
// Surfaces agree
// ============================================================================

#[test]
fn test_surfaces_share_one_style() {
    let engine = hundred_rows().select(4).engine();
    let table = engine.store().dataset().unwrap();
    let mut styler = SpreadsheetStyler::for_engine(&engine);
    let mut heights = RowHeights::new();
    for row in [3, 4] {
        for column in ["gene", "depth", "af"] {
            let field = table.field_at(col(column)).unwrap();
            let cell = CellContext::new(row, field, table.value_at(row, col(column)))
                .selected(table.is_selected(row));
            let expected = engine.compute_style(&cell);

            let label = render_label(&engine, &cell);
            let wrapped = render_wrapped(&engine, &cell, 2);
            let exported = styler.style_cell(&engine, &cell);
            heights.record(row, col(column), wrapped.line_count());

            assert_eq!(label.style, expected.style);
            assert_eq!(wrapped.style, expected.style);
            assert_eq!(label.text, exported.text);
            let key = StyleKey::new(&expected.style, field);
            let index = styler.records().iter().position(|k| *k == key).unwrap();
            assert_eq!(exported.style_index as usize, index + 1);
        }
    }
    assert_eq!(heights.row_height(3), 2);
    assert_eq!(
        render_label(&engine, &CellContext::new(4, &gene(), None).selected(true))
            .style
            .background,
        Some(SELECTION)
    );
}
