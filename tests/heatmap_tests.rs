//! Tests for heat-map gradients and domains
//!
//! ## Gradients
//! - RGB sweeps: red/green channel mirrors with a fixed blue channel
//! - HSV sweeps: hue from 0 to 0.7 at saturation and brightness 0.9
//!
//! ## Domains
//! - Sorting: rank among distinct values
//! - Estimated range: observed min/max
//! - Given range: explicit bounds parsed as the field type
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use annostyle::heatmap::{color_for, compute_domain, ColorDomain};
use annostyle::{
    ColorRange, ConversionMethod, CriterionStore, Field, FieldType, HeatMapCriterion, Rgb,
    StyleError, Value,
};
use common::*;
use test_case::test_case;

// ============================================================================
// Gradients
// ============================================================================

#[test_case(ColorRange::RgbRedToGreen, 0.0, Rgb::new(255, 0, 80) ; "rgb red to green start")]
#[test_case(ColorRange::RgbRedToGreen, 1.0, Rgb::new(0, 255, 80) ; "rgb red to green end")]
#[test_case(ColorRange::RgbGreenToRed, 0.0, Rgb::new(0, 255, 80) ; "rgb green to red start")]
#[test_case(ColorRange::RgbGreenToRed, 1.0, Rgb::new(255, 0, 80) ; "rgb green to red end")]
#[test_case(ColorRange::HsvRedToBlue, 0.0, Rgb::new(230, 23, 23) ; "hsv red to blue start")]
#[test_case(ColorRange::HsvRedToBlue, 1.0, Rgb::new(64, 23, 230) ; "hsv red to blue end")]
#[test_case(ColorRange::HsvBlueToRed, 0.0, Rgb::new(64, 23, 230) ; "hsv blue to red start")]
#[test_case(ColorRange::HsvBlueToRed, 1.0, Rgb::new(230, 23, 23) ; "hsv blue to red end")]
fn test_gradient_endpoints(range: ColorRange, ratio: f64, expected: Rgb) {
    assert_eq!(range.color_at(ratio), expected);
}

#[test]
fn test_rgb_ranges_are_channel_mirrors() {
    for i in 0..=20 {
        let ratio = f64::from(i) / 20.0;
        let a = ColorRange::RgbRedToGreen.color_at(ratio);
        let b = ColorRange::RgbGreenToRed.color_at(ratio);
        assert_eq!((a.r, a.g, a.b), (b.g, b.r, b.b), "ratio {ratio}");
    }
}

#[test]
fn test_ratio_is_clamped() {
    let range = ColorRange::HsvRedToBlue;
    assert_eq!(range.color_at(-3.0), range.color_at(0.0));
    assert_eq!(range.color_at(7.0), range.color_at(1.0));
}

// ============================================================================
// Domains
// ============================================================================

#[test]
fn test_sorting_is_monotonic_in_rank() {
    let field = Field::new("depth", FieldType::Integer);
    let values: Vec<Value> = [40, 10, 30, 10, 20].map(Value::Integer).to_vec();
    let domain = compute_domain(
        &field,
        values.iter().map(Some),
        ConversionMethod::Sorting,
        None,
        None,
    )
    .unwrap();
    assert_eq!(domain.len(), 4);

    let range = ColorRange::RgbRedToGreen;
    let greens: Vec<u8> = [10, 20, 30, 40]
        .map(|v| color_for(Some(&Value::Integer(v)), &domain, range).unwrap().g)
        .to_vec();
    assert!(greens.windows(2).all(|w| w[0] <= w[1]), "{greens:?}");
    assert_eq!(
        color_for(Some(&Value::Integer(10)), &domain, range),
        Some(range.color_at(0.0))
    );
    assert_eq!(
        color_for(Some(&Value::Integer(40)), &domain, range),
        Some(range.color_at(1.0))
    );
}

#[test]
fn test_sorting_text_column() {
    let field = Field::new("gene", FieldType::Text);
    let values = ["TP53", "BRCA2", "ATM"].map(Value::from).to_vec();
    let domain = compute_domain(
        &field,
        values.iter().map(Some),
        ConversionMethod::Sorting,
        None,
        None,
    )
    .unwrap();
    let range = ColorRange::HsvRedToBlue;
    assert_eq!(
        color_for(Some(&Value::from("ATM")), &domain, range),
        Some(range.color_at(0.0))
    );
    assert_eq!(
        color_for(Some(&Value::from("BRCA2")), &domain, range),
        Some(range.color_at(0.5))
    );
}

#[test]
fn test_estimated_range_uses_observed_bounds() {
    let field = Field::new("af", FieldType::Double);
    let values = [0.0, 0.5, 1.0].map(Value::Double).to_vec();
    let domain = compute_domain(
        &field,
        values.iter().map(Some).chain([None]),
        ConversionMethod::RangeData,
        None,
        None,
    )
    .unwrap();
    let range = ColorRange::HsvBlueToRed;
    assert_eq!(
        color_for(Some(&Value::Double(0.5)), &domain, range),
        Some(range.color_at(0.5))
    );
    assert_eq!(color_for(None, &domain, range), None);
}

#[test]
fn test_degenerate_domain_uses_best_endpoint() {
    let field = Field::new("depth", FieldType::Integer);
    let values = [Value::Integer(7), Value::Integer(7)];
    let domain = compute_domain(
        &field,
        values.iter().map(Some),
        ConversionMethod::RangeData,
        None,
        None,
    )
    .unwrap();
    for range in ColorRange::ALL {
        assert_eq!(
            color_for(Some(&Value::Integer(7)), &domain, range),
            Some(range.color_at(range.best_ratio())),
            "{range}"
        );
    }
}

#[test]
fn test_all_null_column_yields_degenerate_domain() {
    let field = Field::new("depth", FieldType::Integer);
    let domain = compute_domain(
        &field,
        [None, None],
        ConversionMethod::RangeData,
        None,
        None,
    )
    .unwrap();
    assert!(matches!(domain, ColorDomain::Range { ref min, ref max } if min == max));
}

#[test]
fn test_given_range_timestamps() {
    let field = Field::new("created", FieldType::Timestamp);
    let domain = compute_domain(
        &field,
        std::iter::empty(),
        ConversionMethod::RangeGiven,
        Some("2024-01-01"),
        Some("2024-01-03"),
    )
    .unwrap();
    let mid = Value::coerce("2024-01-02 00:00:00", FieldType::Timestamp).unwrap();
    let range = ColorRange::RgbGreenToRed;
    assert_eq!(
        color_for(Some(&mid), &domain, range),
        Some(range.color_at(0.5))
    );
}

#[test]
fn test_given_range_rejects_bad_bounds() {
    let field = Field::new("depth", FieldType::Integer);
    let inverted = compute_domain(
        &field,
        std::iter::empty(),
        ConversionMethod::RangeGiven,
        Some("10"),
        Some("1"),
    );
    assert!(matches!(inverted, Err(StyleError::Configuration { .. })));
    let unparsable = compute_domain(
        &field,
        std::iter::empty(),
        ConversionMethod::RangeGiven,
        Some("low"),
        Some("10"),
    );
    assert!(matches!(unparsable, Err(StyleError::Configuration { .. })));
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_wrongly_typed_column_is_type_mismatch() {
    let mut store = CriterionStore::new();
    store
        .bind_dataset(TableBuilder::new().depth_row("TP53", 3).shared())
        .unwrap();
    let err = store
        .add_heat_map(HeatMapCriterion::new(
            Field::new("gene", FieldType::Integer),
            ColorRange::HsvRedToBlue,
            ConversionMethod::RangeData,
        ))
        .unwrap_err();
    assert!(matches!(err, StyleError::TypeMismatch { .. }));
    assert!(store.heat_maps().is_empty());
}

#[test]
fn test_data_driven_heat_map_waits_for_dataset() {
    let mut store = CriterionStore::new();
    store
        .add_heat_map(HeatMapCriterion::new(
            depth(),
            ColorRange::HsvRedToBlue,
            ConversionMethod::Sorting,
        ))
        .unwrap();
    assert!(store.heat_map("depth").unwrap().domain().is_none());
    store
        .bind_dataset(
            TableBuilder::new()
                .depth_row("TP53", 3)
                .depth_row("ATM", 9)
                .shared(),
        )
        .unwrap();
    assert_eq!(store.heat_map("depth").unwrap().domain().unwrap().len(), 2);
}
