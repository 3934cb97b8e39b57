//! End-to-end tests of the styling pipeline
//!
//! Covers the fixed precedence of the eight styling steps:
//! parity, related rows, vocabulary, allele sanity check, row highlights,
//! cell highlights, heat maps and selection.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use annostyle::{
    CellContext, ColorRange, ComparisonOperator, Condition, ConversionMethod, HeatMapCriterion,
    HighlightCriterion, Predicate, Rgb, StyleEngine, StyleError, Value,
};
use common::*;

fn depth_over_20() -> Predicate {
    Predicate::compare(ComparisonOperator::Greater, ["20"])
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_allele_count_warning() {
    let engine = TableBuilder::new()
        .row(("TP53", Some(30), None, Some(3), None))
        .row(("TP53", Some(30), None, Some(2), None))
        .engine();
    assert_eq!(background(&engine, 0, "allele_num"), Some(Rgb::RED));
    assert_eq!(background(&engine, 1, "allele_num"), Some(plain_row(1)));
}

#[test]
fn test_scenario_percent_display() {
    let mut engine = TableBuilder::new()
        .row(("TP53", None, Some(0.1234), None, None))
        .engine();
    engine
        .store_mut()
        .add_highlight(
            HighlightCriterion::cell(
                allele_frequency(),
                Predicate::compare(ComparisonOperator::RangeII, ["0.12", "0.13"]),
            )
            .bold(),
        )
        .unwrap();
    let cell = engine
        .style_table_cell(0, col("af"), &engine.selected_groups())
        .unwrap();
    assert_eq!(cell.text, "12.34%");
    assert!(cell.style.bold);
}

#[test]
fn test_scenario_status_vocabulary() {
    let engine = TableBuilder::new()
        .row(("TP53", None, None, None, Some("validated")))
        .row(("TP53", None, None, None, Some("5")))
        .row(("TP53", None, None, None, Some("pending")))
        .engine();
    assert_eq!(background(&engine, 0, "evaluation"), Some(Rgb::GREEN));
    assert_eq!(
        background(&engine, 1, "evaluation"),
        Some(Rgb::new(192, 0, 0))
    );
    assert_eq!(background(&engine, 2, "evaluation"), Some(plain_row(2)));
}

#[test]
fn test_scenario_related_rows() {
    let engine = TableBuilder::new()
        .depth_row("X", 1)
        .depth_row("X", 2)
        .depth_row("X", 3)
        .depth_row("Y", 4)
        .select(1)
        .grouped_by_gene()
        .engine();
    assert_eq!(background(&engine, 0, "gene"), Some(related_row(0)));
    assert_eq!(background(&engine, 1, "gene"), Some(SELECTION));
    assert_eq!(background(&engine, 2, "gene"), Some(related_row(2)));
    assert_eq!(background(&engine, 3, "gene"), Some(plain_row(3)));
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_heat_map_overrides_highlight() {
    let mut engine = TableBuilder::new().depth_row("TP53", 50).engine();
    let store = engine.store_mut();
    store
        .add_highlight(
            HighlightCriterion::cell(depth(), depth_over_20())
                .with_background(Rgb::RED)
                .bold(),
        )
        .unwrap();
    store
        .add_heat_map(
            HeatMapCriterion::new(depth(), ColorRange::HsvRedToBlue, ConversionMethod::RangeGiven)
                .with_bounds("0", "100"),
        )
        .unwrap();

    let cell = engine
        .style_table_cell(0, col("depth"), &engine.selected_groups())
        .unwrap();
    assert_eq!(
        cell.style.background,
        Some(ColorRange::HsvRedToBlue.color_at(0.5))
    );
    assert!(cell.style.bold, "emphasis survives the heat map");
}

#[test]
fn test_selection_overrides_everything() {
    let mut engine = TableBuilder::new()
        .row(("TP53", Some(50), None, Some(4), Some("OK")))
        .select(0)
        .engine();
    let store = engine.store_mut();
    store
        .add_highlight(HighlightCriterion::cell(depth(), depth_over_20()).with_background(Rgb::RED))
        .unwrap();
    store
        .add_heat_map(HeatMapCriterion::new(
            depth(),
            ColorRange::RgbGreenToRed,
            ConversionMethod::Sorting,
        ))
        .unwrap();
    for column in ["gene", "depth", "allele_num", "evaluation"] {
        assert_eq!(background(&engine, 0, column), Some(SELECTION), "{column}");
    }
}

#[test]
fn test_later_highlight_wins_per_attribute() {
    let mut engine = TableBuilder::new().depth_row("TP53", 50).engine();
    let store = engine.store_mut();
    store
        .add_highlight(
            HighlightCriterion::cell(depth(), depth_over_20())
                .with_background(Rgb::RED)
                .with_foreground(Rgb::WHITE),
        )
        .unwrap();
    store
        .add_highlight(
            HighlightCriterion::cell(
                depth(),
                Predicate::compare(ComparisonOperator::Smaller, ["100"]),
            )
            .with_background(Rgb::ORANGE)
            .italic(),
        )
        .unwrap();
    let cell = engine
        .style_table_cell(0, col("depth"), &engine.selected_groups())
        .unwrap();
    assert_eq!(cell.style.background, Some(Rgb::ORANGE));
    assert_eq!(cell.style.foreground, Some(Rgb::WHITE));
    assert!(cell.style.italic);
}

#[test]
fn test_compute_style_is_idempotent() {
    let mut engine = TableBuilder::new()
        .depth_row("TP53", 50)
        .depth_row("BRCA2", 5)
        .engine();
    engine
        .store_mut()
        .add_heat_map(
            HeatMapCriterion::new(depth(), ColorRange::HsvBlueToRed, ConversionMethod::RangeData)
                .expanding(),
        )
        .unwrap();
    assert_eq!(engine.style_table(), engine.style_table());
}

// ============================================================================
// Row criteria and row-expanding heat maps
// ============================================================================

#[test]
fn test_row_highlight_reads_its_own_column() {
    let mut engine = TableBuilder::new()
        .depth_row("TP53", 40)
        .depth_row("BRCA2", 10)
        .engine();
    engine
        .store_mut()
        .add_highlight(HighlightCriterion::row(Some(depth()), depth_over_20()).bold())
        .unwrap();
    let groups = engine.selected_groups();
    assert!(engine.style_table_cell(0, col("gene"), &groups).unwrap().style.bold);
    assert!(engine.style_table_cell(0, col("af"), &groups).unwrap().style.bold);
    assert!(!engine.style_table_cell(1, col("gene"), &groups).unwrap().style.bold);
}

#[test]
fn test_unbound_row_highlight_tests_each_cell() {
    let mut engine = TableBuilder::new().depth_row("TP53", 40).engine();
    engine
        .store_mut()
        .add_highlight(
            HighlightCriterion::row(
                None,
                Predicate::compare(ComparisonOperator::Contains, ["tp"]),
            )
            .italic(),
        )
        .unwrap();
    let groups = engine.selected_groups();
    assert!(engine.style_table_cell(0, col("gene"), &groups).unwrap().style.italic);
    assert!(!engine.style_table_cell(0, col("depth"), &groups).unwrap().style.italic);
}

#[test]
fn test_row_highlight_without_dataset_only_styles_its_field() {
    let mut engine = StyleEngine::default();
    engine
        .store_mut()
        .add_highlight(HighlightCriterion::row(Some(depth()), depth_over_20()).bold())
        .unwrap();
    let value = Value::Integer(40);
    let gene_field = gene();
    let depth_field = depth();
    let own = engine.compute_style(&CellContext::new(0, &depth_field, Some(&value)));
    let other = engine.compute_style(&CellContext::new(0, &gene_field, Some(&value)));
    assert!(own.style.bold);
    assert!(!other.style.bold);
}

#[test]
fn test_expanding_heat_map_colors_whole_row() {
    let mut engine = TableBuilder::new()
        .row(("TP53", Some(1), Some(0.5), None, Some("OK")))
        .row(("BRCA2", Some(1), None, None, None))
        .engine();
    engine
        .store_mut()
        .add_heat_map(
            HeatMapCriterion::new(
                allele_frequency(),
                ColorRange::HsvBlueToRed,
                ConversionMethod::RangeGiven,
            )
            .with_bounds("0", "1")
            .expanding(),
        )
        .unwrap();
    let mid = ColorRange::HsvBlueToRed.color_at(0.5);
    assert_eq!(background(&engine, 0, "gene"), Some(mid));
    assert_eq!(background(&engine, 0, "evaluation"), Some(mid));
    assert_eq!(background(&engine, 1, "gene"), Some(plain_row(1)));
}

// ============================================================================
// Nulls and failures
// ============================================================================

#[test]
fn test_null_cells_match_only_null_tests() {
    let mut engine = TableBuilder::new().row(("TP53", None, None, None, None)).engine();
    let store = engine.store_mut();
    store
        .add_highlight(HighlightCriterion::cell(depth(), depth_over_20()).bold())
        .unwrap();
    store
        .add_highlight(
            HighlightCriterion::cell(depth(), Predicate::Compare(Condition::is_null())).italic(),
        )
        .unwrap();
    store
        .add_heat_map(HeatMapCriterion::new(
            depth(),
            ColorRange::RgbRedToGreen,
            ConversionMethod::RangeData,
        ))
        .unwrap();
    let cell = engine
        .style_table_cell(0, col("depth"), &engine.selected_groups())
        .unwrap();
    assert_eq!(cell.text, "");
    assert!(!cell.style.bold);
    assert!(cell.style.italic);
    assert_eq!(cell.style.background, Some(plain_row(0)));
}

#[test]
fn test_failing_predicate_is_skipped() {
    let mut engine = TableBuilder::new().depth_row("TP53", 50).engine();
    let store = engine.store_mut();
    store
        .add_highlight(
            HighlightCriterion::cell(
                depth(),
                Predicate::custom(|_| {
                    Err(StyleError::Evaluation {
                        field: "depth".to_string(),
                        message: "lookup failed".to_string(),
                    })
                }),
            )
            .with_background(Rgb::BLACK),
        )
        .unwrap();
    store
        .add_highlight(HighlightCriterion::cell(depth(), depth_over_20()).bold())
        .unwrap();
    let cell = engine
        .style_table_cell(0, col("depth"), &engine.selected_groups())
        .unwrap();
    assert_eq!(cell.style.background, Some(plain_row(0)));
    assert!(cell.style.bold);
}
