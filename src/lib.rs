//! annostyle - rule-based styling for annotation tables
//!
//! Decides the visual style of every cell of a large tabular dataset:
//! - Status columns colored through a controlled vocabulary
//! - Highlight criteria on a cell or a whole row, with comparison or custom predicates
//! - Heat-map gradients over numeric, chronological or textual columns
//! - Selection and related-row tinting on alternating row backgrounds
//! - One pipeline shared by grid labels, wrapped cells and spreadsheet export
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use annostyle::{EngineConfig, MemoryTable, RuleSet, StyleEngine};
//!
//! # fn main() -> annostyle::Result<()> {
//! let table = MemoryTable::from_json(&std::fs::read_to_string("table.json")?)?;
//! let mut engine = StyleEngine::with_dataset(EngineConfig::default(), Arc::new(table))?;
//! RuleSet::from_file("rules.json")?.apply(engine.store_mut())?;
//! for row in engine.style_table() {
//!     for cell in row {
//!         println!("{} {:?}", cell.text, cell.style.background);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// Model
pub mod color;
pub mod config;
pub mod error;
pub mod table;
pub mod types;

// Rules
pub mod criteria;
pub mod heatmap;
pub mod predicate;
pub mod rules;
pub mod store;
pub mod vocabulary;

// Styling
pub mod engine;
pub mod format;
pub mod pipeline;
pub mod render;

use serde::Serialize;
use std::sync::Arc;

pub use color::{Palette, Rgb};
pub use config::{EngineConfig, Theme};
pub use criteria::{CriterionId, HeatMapCriterion, HighlightCriterion, Scope};
pub use engine::StyleEngine;
pub use error::{Result, StyleError};
pub use heatmap::{ColorRange, ConversionMethod};
pub use pipeline::{CellContext, SelectedGroups, StylingPipeline};
pub use predicate::{ComparisonOperator, Condition, Predicate};
pub use rules::{HighlightRule, RuleSet};
pub use store::{CriterionStore, RepaintReason, SharedTable};
pub use table::{MemoryTable, TableSource};

pub use types::*;

#[derive(Serialize)]
struct CellOutput<'a> {
    text: &'a str,
    #[serde(flatten)]
    style: &'a StyleResult,
}

/// Style a JSON table with an optional JSON rule set and return the styled
/// cells as a JSON array of rows.
///
/// Each cell is `{"text", "background", "foreground", "bold", "italic"}`.
///
/// # Errors
/// Returns an error if either document is malformed or a rule is rejected.
pub fn style_table_json(
    table_json: &str,
    rules_json: Option<&str>,
    config: EngineConfig,
) -> Result<String> {
    config.validate()?;
    let table = MemoryTable::from_json(table_json)?;
    let mut engine = StyleEngine::with_dataset(config, Arc::new(table))?;
    if let Some(rules) = rules_json {
        RuleSet::from_json(rules)?.apply(engine.store_mut())?;
    }

    let cells = engine.style_table();
    let rows: Vec<Vec<CellOutput<'_>>> = cells
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| CellOutput {
                    text: &cell.text,
                    style: &cell.style,
                })
                .collect()
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
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

    #[test]
    fn test_style_table_json() {
        let table = r#"{
            "fields": [{"name": "depth", "type": "integer"}],
            "rows": [[40], [null]]
        }"#;
        let rules = r##"{"highlights": [{"field": {"name": "depth", "type": "integer"},
            "condition": {"operator": "GREATER", "values": ["20"]}, "bold": true}]}"##;
        let json = style_table_json(table, Some(rules), EngineConfig::default()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0][0]["text"], "40");
        assert_eq!(parsed[0][0]["bold"], true);
        assert_eq!(parsed[0][0]["background"], "#FFE0B2");
        assert_eq!(parsed[1][0]["text"], "");
        assert_eq!(parsed[1][0]["bold"], false);
    }

    #[test]
    fn test_style_table_json_percent_tags() {
        let table = r#"{
            "fields": [
                {"name": "af", "type": "double", "tags": ["percent-2"]},
                {"name": "ratio", "type": "double", "tags": ["percent-0"]}
            ],
            "rows": [[0.1234, 0.5]]
        }"#;
        let json = style_table_json(table, None, EngineConfig::default()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0][0]["text"], "12.34%");
        assert_eq!(parsed[0][1]["text"], "50%");
    }

    #[test]
    fn test_style_table_json_rejects_bad_rule() {
        let table = r#"{"fields": [{"name": "gene", "type": "text"}], "rows": []}"#;
        let rules = r#"{"highlights": [{"field": {"name": "gene", "type": "text"},
            "condition": {"operator": "GREATER", "values": ["A"]}}]}"#;
        let err = style_table_json(table, Some(rules), EngineConfig::default()).unwrap_err();
        assert!(err.is_registration_error());
    }
}
