//! Shared builders for the integration tests.
//!
//! Every test table is a small variant list with the same five columns so
//! scenarios can be read side by side.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use annostyle::{
    EngineConfig, Field, FieldType, FormatTag, MemoryTable, Palette, Rgb, SharedTable,
    StyleEngine, Value,
};
use std::sync::Arc;

pub const SELECTION: Rgb = Rgb::new(51, 153, 255);

pub fn gene() -> Field {
    Field::new("gene", FieldType::Text)
}

pub fn depth() -> Field {
    Field::new("depth", FieldType::Integer)
}

pub fn allele_frequency() -> Field {
    Field::new("af", FieldType::Double).with_tag(FormatTag::Percent2)
}

pub fn allele_count() -> Field {
    Field::new("allele_num", FieldType::Integer)
}

pub fn evaluation() -> Field {
    Field::new("evaluation", FieldType::Vocabulary)
}

/// One variant row: gene, depth, af, allele count, evaluation.
pub type Row = (&'static str, Option<i32>, Option<f64>, Option<i32>, Option<&'static str>);

/// Builds tables of variant rows.
#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<Row>,
    selected: Vec<usize>,
    group_by_gene: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    /// Row with only a gene and a depth.
    #[must_use]
    pub fn depth_row(self, gene: &'static str, depth: i32) -> Self {
        self.row((gene, Some(depth), None, None, None))
    }

    #[must_use]
    pub fn select(mut self, row: usize) -> Self {
        self.selected.push(row);
        self
    }

    #[must_use]
    pub fn grouped_by_gene(mut self) -> Self {
        self.group_by_gene = true;
        self
    }

    pub fn build(self) -> MemoryTable {
        let mut table = MemoryTable::new(vec![
            gene(),
            depth(),
            allele_frequency(),
            allele_count(),
            evaluation(),
        ]);
        for (g, d, af, an, ev) in self.rows {
            table
                .push_row(vec![
                    Some(Value::from(g)),
                    d.map(Value::Integer),
                    af.map(Value::Double),
                    an.map(Value::Integer),
                    ev.map(Value::from),
                ])
                .unwrap();
        }
        for row in self.selected {
            table.select(row);
        }
        if self.group_by_gene {
            table = table.group_by("gene").unwrap();
        }
        table
    }

    pub fn shared(self) -> SharedTable {
        Arc::new(self.build())
    }

    pub fn engine(self) -> StyleEngine {
        StyleEngine::with_dataset(EngineConfig::default(), self.shared()).unwrap()
    }
}

/// Column index in the builder's layout.
pub fn col(name: &str) -> usize {
    match name {
        "gene" => 0,
        "depth" => 1,
        "af" => 2,
        "allele_num" => 3,
        "evaluation" => 4,
        other => panic!("no column {other}"),
    }
}

pub fn background(engine: &StyleEngine, row: usize, column: &str) -> Option<Rgb> {
    let groups = engine.selected_groups();
    engine
        .style_table_cell(row, col(column), &groups)
        .unwrap()
        .style
        .background
}

pub fn plain_row(row: usize) -> Rgb {
    Palette::Orange.row_color(row)
}

pub fn related_row(row: usize) -> Rgb {
    Palette::Purple.row_color(row)
}
