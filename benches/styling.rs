//! Benchmarks for cell styling throughput.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss
)]

use annostyle::render::SpreadsheetStyler;
use annostyle::{
    ColorRange, ComparisonOperator, ConversionMethod, EngineConfig, Field, FieldType, FormatTag,
    HeatMapCriterion, HighlightCriterion, MemoryTable, Predicate, Rgb, StyleEngine, Value,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

const STATUSES: [&str; 4] = ["VALIDATED", "SUSPECT", "INVALIDATED", "unknown"];

fn variant_table(rows: usize) -> MemoryTable {
    let mut table = MemoryTable::new(vec![
        Field::new("gene", FieldType::Text),
        Field::new("depth", FieldType::Integer),
        Field::new("af", FieldType::Double).with_tag(FormatTag::Percent2),
        Field::new("check_validated_variant", FieldType::Vocabulary),
        Field::new("position", FieldType::Long),
    ]);
    for i in 0..rows {
        table
            .push_row(vec![
                Some(Value::from(format!("GENE{}", i % 50))),
                Some(Value::Integer((i % 97) as i32)),
                Some(Value::Double((i % 100) as f64 / 100.0)),
                Some(Value::from(STATUSES[i % STATUSES.len()])),
                Some(Value::Long(1_000_000 + i as i64)),
            ])
            .unwrap();
    }
    table.group_by("gene").unwrap()
}

fn engine(rows: usize) -> StyleEngine {
    let mut table = variant_table(rows);
    table.select(0);
    let mut engine = StyleEngine::with_dataset(EngineConfig::default(), Arc::new(table)).unwrap();
    let store = engine.store_mut();
    store
        .add_highlight(
            HighlightCriterion::cell(
                Field::new("depth", FieldType::Integer),
                Predicate::compare(ComparisonOperator::Greater, ["20"]),
            )
            .with_background(Rgb::RED)
            .bold(),
        )
        .unwrap();
    store
        .add_highlight(
            HighlightCriterion::row(
                Some(Field::new("gene", FieldType::Text)),
                Predicate::compare(ComparisonOperator::Contains, ["GENE1"]),
            )
            .italic(),
        )
        .unwrap();
    store
        .add_heat_map(HeatMapCriterion::new(
            Field::new("af", FieldType::Double),
            ColorRange::HsvBlueToRed,
            ConversionMethod::RangeData,
        ))
        .unwrap();
    engine
}

/// Style every cell of tables of increasing size
fn bench_style_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("style_table");
    for rows in [100, 1_000, 10_000] {
        let engine = engine(rows);
        group.throughput(Throughput::Elements((rows * 5) as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &engine, |b, engine| {
            b.iter(|| black_box(engine.style_table()))
        });
    }
    group.finish();
}

/// Build a heat-map domain over a large column
fn bench_domain_rebuild(c: &mut Criterion) {
    let table: Arc<MemoryTable> = Arc::new(variant_table(10_000));
    c.bench_function("sorting_domain_10000", |b| {
        b.iter(|| {
            let mut engine =
                StyleEngine::with_dataset(EngineConfig::default(), Arc::clone(&table)).unwrap();
            engine
                .store_mut()
                .add_heat_map(HeatMapCriterion::new(
                    Field::new("depth", FieldType::Integer),
                    ColorRange::RgbGreenToRed,
                    ConversionMethod::Sorting,
                ))
                .unwrap();
            black_box(engine)
        })
    });
}

/// Style and intern a full export, then write the styles part
fn bench_spreadsheet_export(c: &mut Criterion) {
    let engine = engine(10_000);
    let mut group = c.benchmark_group("spreadsheet_export");
    group.throughput(Throughput::Elements(50_000));
    group.bench_function("export_10000", |b| {
        b.iter(|| {
            let mut styler = SpreadsheetStyler::for_engine(&engine);
            let cells = styler.style_table(&engine);
            black_box((cells, styler.styles_xml().unwrap()))
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_style_table,
    bench_domain_rebuild,
    bench_spreadsheet_export,
);

criterion_main!(benches);
