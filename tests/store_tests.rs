//! Tests for the criterion store
//!
//! Registration order, validation at registration, render-target
//! notification and off-thread mutation through the command channel.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use annostyle::store::{criterion_channel, CriterionCommand};
use annostyle::{
    ColorRange, ComparisonOperator, ConversionMethod, CriterionStore, Field, FieldType,
    HeatMapCriterion, HighlightCriterion, Predicate, RepaintReason, Rgb, StyleError,
};
use common::*;
use std::sync::{Arc, Mutex};
use std::thread;

fn equal(values: &[&str]) -> Predicate {
    Predicate::compare(ComparisonOperator::Equal, values.iter().copied())
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_highlights_keep_registration_order() {
    let mut store = CriterionStore::new();
    let first = store
        .add_highlight(HighlightCriterion::cell(gene(), equal(&["TP53"])).bold())
        .unwrap();
    let second = store
        .add_highlight(HighlightCriterion::row(None, equal(&["x"])))
        .unwrap();
    let third = store
        .add_highlight(HighlightCriterion::cell(gene(), equal(&["ATM"])).italic())
        .unwrap();
    let ids: Vec<_> = store.highlights().iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![first, second, third]);
    let cell_ids: Vec<_> = store.cell_highlights("gene").map(|h| h.id).collect();
    assert_eq!(cell_ids, vec![first, third]);
    assert_eq!(store.row_highlights().count(), 1);
}

#[test]
fn test_rejected_highlight_leaves_store_unchanged() {
    let mut store = CriterionStore::new();
    store
        .add_highlight(HighlightCriterion::cell(depth(), equal(&["3"])))
        .unwrap();

    let ordered_on_text = HighlightCriterion::cell(
        gene(),
        Predicate::compare(ComparisonOperator::Greater, ["A"]),
    );
    assert!(matches!(
        store.add_highlight(ordered_on_text),
        Err(StyleError::TypeMismatch { .. })
    ));

    let empty_values = HighlightCriterion::cell(depth(), equal(&[]));
    assert!(matches!(
        store.add_highlight(empty_values),
        Err(StyleError::Configuration { .. })
    ));

    let bad_bound = HighlightCriterion::cell(
        depth(),
        Predicate::compare(ComparisonOperator::RangeIE, ["10", "deep"]),
    );
    assert!(matches!(
        store.add_highlight(bad_bound),
        Err(StyleError::Configuration { .. })
    ));

    assert_eq!(store.highlights().len(), 1);
}

#[test]
fn test_heat_map_replaces_same_field() {
    let mut store = CriterionStore::new();
    store
        .add_heat_map(HeatMapCriterion::new(
            depth(),
            ColorRange::HsvRedToBlue,
            ConversionMethod::Sorting,
        ))
        .unwrap();
    store
        .add_heat_map(
            HeatMapCriterion::new(
                allele_frequency(),
                ColorRange::HsvRedToBlue,
                ConversionMethod::RangeGiven,
            )
            .with_bounds("0", "1"),
        )
        .unwrap();
    store
        .add_heat_map(HeatMapCriterion::new(
            depth(),
            ColorRange::RgbGreenToRed,
            ConversionMethod::Sorting,
        ))
        .unwrap();
    let names: Vec<_> = store
        .heat_maps()
        .iter()
        .map(|h| h.criterion.field.name.as_str())
        .collect();
    assert_eq!(names, vec!["af", "depth"]);
    assert_eq!(
        store.heat_map("depth").unwrap().criterion.color_range,
        ColorRange::RgbGreenToRed
    );
    assert!(store.remove_heat_map("depth"));
    assert!(!store.remove_heat_map("depth"));
}

#[test]
fn test_rebinding_rebuilds_domains() {
    let mut store = CriterionStore::new();
    store
        .bind_dataset(TableBuilder::new().depth_row("TP53", 3).shared())
        .unwrap();
    store
        .add_heat_map(HeatMapCriterion::new(
            depth(),
            ColorRange::HsvRedToBlue,
            ConversionMethod::Sorting,
        ))
        .unwrap();
    assert_eq!(store.heat_map("depth").unwrap().domain().unwrap().len(), 1);

    store
        .replace_dataset(
            TableBuilder::new()
                .depth_row("TP53", 3)
                .depth_row("ATM", 8)
                .depth_row("ATM", 12)
                .shared(),
        )
        .unwrap();
    assert_eq!(store.heat_map("depth").unwrap().domain().unwrap().len(), 3);

    store.unbind_dataset();
    assert!(store.heat_map("depth").unwrap().domain().is_none());
}

#[test]
fn test_rejected_domain_leaves_store_unchanged() {
    let mut store = CriterionStore::new();
    let first = TableBuilder::new().depth_row("TP53", 3).shared();
    store.bind_dataset(Arc::clone(&first)).unwrap();
    store
        .add_heat_map(HeatMapCriterion::new(
            Field::new("gene", FieldType::Integer),
            ColorRange::HsvRedToBlue,
            ConversionMethod::RangeData,
        ))
        .unwrap_err();
    store
        .add_heat_map(HeatMapCriterion::new(
            Field::new("gene", FieldType::Text),
            ColorRange::HsvRedToBlue,
            ConversionMethod::RangeData,
        ))
        .unwrap();

    // the depth column holds integers, so a timestamp heat map cannot bind
    let mut strict = CriterionStore::new();
    strict
        .add_heat_map(HeatMapCriterion::new(
            Field::new("depth", FieldType::Timestamp),
            ColorRange::HsvRedToBlue,
            ConversionMethod::RangeData,
        ))
        .unwrap();
    assert!(matches!(
        strict.bind_dataset(first),
        Err(StyleError::TypeMismatch { .. })
    ));
    assert!(strict.dataset().is_none());
    assert!(strict.heat_map("depth").unwrap().domain().is_none());
    assert_eq!(store.heat_maps().len(), 1);
    assert!(store.dataset().is_some());
}

#[test]
fn test_field_type_must_match_bound_column() {
    let depth_as_double = Field::new("depth", FieldType::Double);
    let mut store = CriterionStore::new();
    store
        .bind_dataset(TableBuilder::new().depth_row("TP53", 3).shared())
        .unwrap();

    let highlight = HighlightCriterion::cell(
        depth_as_double.clone(),
        Predicate::compare(ComparisonOperator::Greater, ["1"]),
    )
    .bold();
    assert!(matches!(
        store.add_highlight(highlight),
        Err(StyleError::TypeMismatch { .. })
    ));

    let given_range = HeatMapCriterion::new(
        depth_as_double.clone(),
        ColorRange::HsvRedToBlue,
        ConversionMethod::RangeGiven,
    )
    .with_bounds("0", "10");
    assert!(matches!(
        store.add_heat_map(given_range),
        Err(StyleError::TypeMismatch { .. })
    ));
    assert!(store.highlights().is_empty());
    assert!(store.heat_maps().is_empty());

    // registered before any dataset, caught when one is bound
    let mut unbound = CriterionStore::new();
    unbound
        .add_highlight(HighlightCriterion::row(
            Some(depth_as_double),
            Predicate::compare(ComparisonOperator::Smaller, ["2.5"]),
        ))
        .unwrap();
    assert!(matches!(
        unbound.bind_dataset(TableBuilder::new().depth_row("TP53", 3).shared()),
        Err(StyleError::TypeMismatch { .. })
    ));
    assert!(unbound.dataset().is_none());
    assert_eq!(unbound.highlights().len(), 1);
}

// ============================================================================
// Render targets
// ============================================================================

#[test]
fn test_every_mutation_notifies_render_targets() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut store = CriterionStore::new();
    let sink = Arc::clone(&seen);
    store.register_render_target("grid", move |reason| sink.lock().unwrap().push(reason));

    let id = store
        .add_highlight(HighlightCriterion::cell(gene(), equal(&["TP53"])).with_background(Rgb::RED))
        .unwrap();
    store.remove_highlight(id);
    store
        .add_heat_map(HeatMapCriterion::new(
            depth(),
            ColorRange::HsvRedToBlue,
            ConversionMethod::Sorting,
        ))
        .unwrap();
    store
        .bind_dataset(TableBuilder::new().depth_row("TP53", 3).shared())
        .unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            RepaintReason::HighlightsChanged,
            RepaintReason::HighlightsChanged,
            RepaintReason::HeatMapsChanged,
            RepaintReason::DatasetReplaced,
        ]
    );
}

#[test]
fn test_render_target_replaced_by_key() {
    let hits = Arc::new(Mutex::new(0_u32));
    let mut store = CriterionStore::new();
    for _ in 0..2 {
        let hits = Arc::clone(&hits);
        store.register_render_target("grid", move |_| *hits.lock().unwrap() += 1);
    }
    assert_eq!(store.render_target_count(), 1);
    store.clear_highlights();
    assert_eq!(*hits.lock().unwrap(), 1);
    assert!(store.unregister_render_target("grid"));
    store.clear_highlights();
    assert_eq!(*hits.lock().unwrap(), 1);
}

// ============================================================================
// Command channel
// ============================================================================

#[test]
fn test_commands_from_worker_thread_apply_in_order() {
    let (handle, pending) = criterion_channel();
    let worker = thread::spawn(move || {
        handle.add_highlight(HighlightCriterion::cell(gene(), equal(&["TP53"])).bold());
        handle.add_highlight(HighlightCriterion::cell(gene(), Predicate::compare(
            ComparisonOperator::Greater,
            ["A"],
        )));
        handle.add_heat_map(HeatMapCriterion::new(
            depth(),
            ColorRange::HsvRedToBlue,
            ConversionMethod::Sorting,
        ));
        handle.replace_dataset(TableBuilder::new().depth_row("TP53", 3).shared());
        handle.send(CriterionCommand::RemoveHeatMap("af".to_string()))
    });
    assert!(worker.join().unwrap());

    let mut store = CriterionStore::new();
    let failures = pending.apply(&mut store);
    assert_eq!(failures.len(), 1);
    assert!(failures[0].is_registration_error());
    assert_eq!(store.highlights().len(), 1);
    assert_eq!(store.heat_map("depth").unwrap().domain().unwrap().len(), 1);
    assert!(store.dataset().is_some());
    assert!(pending.apply(&mut store).is_empty());
}
