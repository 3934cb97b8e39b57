//! The styling pipeline
//!
//! [`StylingPipeline::compute_style`] turns one raw cell into a
//! [`StyledCell`]. Rule sources are applied in a fixed order and each later
//! step overrides what the earlier ones set:
//!
//! 1. row parity background
//! 2. related-row background (same grouping key as a selected row)
//! 3. status vocabulary colors
//! 4. allele-count sanity warning
//! 5. row-scoped highlights
//! 6. cell-scoped highlights
//! 7. heat maps (row-expanding ones first, then the cell's own field)
//! 8. selection background
//!
//! A rule that fails on one cell is logged and skipped; styling never fails.

use std::collections::HashSet;

use crate::config::EngineConfig;
use crate::format::display_text;
use crate::store::{CriterionStore, RegisteredHighlight};
use crate::table::TableSource;
use crate::types::{Field, StyleResult, StyledCell, Value};
use crate::vocabulary::status_color;

/// Grouping keys of the currently selected rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedGroups(HashSet<String>);

impl SelectedGroups {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// Collect the grouping keys of every selected row of `source`.
    pub fn from_source(source: &dyn TableSource) -> Self {
        Self(
            source
                .selected_rows()
                .into_iter()
                .filter_map(|row| source.grouping_key(row))
                .collect(),
        )
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything the pipeline needs to know about one cell.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    pub row: usize,
    pub field: &'a Field,
    /// Raw, unformatted value. `None` is null.
    pub value: Option<&'a Value>,
    pub is_selected: bool,
    pub grouping_key: Option<&'a str>,
    pub selected_groups: Option<&'a SelectedGroups>,
}

impl<'a> CellContext<'a> {
    pub const fn new(row: usize, field: &'a Field, value: Option<&'a Value>) -> Self {
        Self {
            row,
            field,
            value,
            is_selected: false,
            grouping_key: None,
            selected_groups: None,
        }
    }

    #[must_use]
    pub const fn selected(mut self, is_selected: bool) -> Self {
        self.is_selected = is_selected;
        self
    }

    #[must_use]
    pub const fn grouped(
        mut self,
        grouping_key: Option<&'a str>,
        selected_groups: Option<&'a SelectedGroups>,
    ) -> Self {
        self.grouping_key = grouping_key;
        self.selected_groups = selected_groups;
        self
    }

    fn is_related(&self) -> bool {
        match (self.grouping_key, self.selected_groups) {
            (Some(key), Some(groups)) => groups.contains(key),
            _ => false,
        }
    }
}

/// Stateless styling stage; all mutable state lives in the store.
#[derive(Debug, Clone, Default)]
pub struct StylingPipeline {
    config: EngineConfig,
}

impl StylingPipeline {
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Style and format one cell.
    pub fn compute_style(&self, store: &CriterionStore, cell: &CellContext<'_>) -> StyledCell {
        let theme = &self.config.theme;
        let mut style = StyleResult::on(theme.row_background(cell.row));

        if !cell.is_selected && cell.is_related() {
            style.background = Some(theme.related_background(cell.row));
        }

        let raw_text = cell.value.map(ToString::to_string);
        if let Some(text) = raw_text.as_deref() {
            if self.config.is_status_field(&cell.field.name) {
                if let Some(color) = status_color(text) {
                    style.background = Some(color);
                }
            }
            if self.config.is_allele_count_field(&cell.field.name) && !text.is_empty() {
                match text.trim().parse::<i64>() {
                    Ok(n) if n > 2 => style.background = Some(theme.warning),
                    Ok(_) => {}
                    Err(e) => tracing::warn!(
                        field = %cell.field.name,
                        row = cell.row,
                        value = text,
                        error = %e,
                        "allele count is not an integer"
                    ),
                }
            }
        }

        for highlight in store.row_highlights() {
            if let Some(value) = row_criterion_value(store, highlight, cell) {
                apply_highlight(highlight, value, cell, &mut style);
            }
        }
        for highlight in store.cell_highlights(&cell.field.name) {
            apply_highlight(highlight, cell.value, cell, &mut style);
        }

        apply_heat_maps(store, cell, &mut style);

        if cell.is_selected {
            style.background = Some(theme.selection);
        }

        let text = display_text(cell.field, cell.value).unwrap_or_else(|e| {
            tracing::warn!(row = cell.row, error = %e, "showing raw value");
            raw_text.unwrap_or_default()
        });
        StyledCell { style, text }
    }
}

/// The value a row criterion tests for this cell, or `None` when the
/// criterion does not apply to it.
fn row_criterion_value<'v>(
    store: &'v CriterionStore,
    highlight: &RegisteredHighlight,
    cell: &CellContext<'v>,
) -> Option<Option<&'v Value>> {
    let Some(name) = highlight.criterion.field_name() else {
        return Some(cell.value);
    };
    if name == cell.field.name {
        return Some(cell.value);
    }
    let table = store.dataset()?;
    let col = table.column_of(name)?;
    Some(table.value_at(cell.row, col))
}

fn apply_heat_maps(store: &CriterionStore, cell: &CellContext<'_>, style: &mut StyleResult) {
    if let Some(table) = store.dataset() {
        for heat_map in store.expanding_heat_maps() {
            let Some(col) = table.column_of(&heat_map.criterion.field.name) else {
                continue;
            };
            match heat_map.color_for(table.value_at(cell.row, col)) {
                Ok(Some(color)) => style.background = Some(color),
                Ok(None) => {}
                Err(e) => tracing::warn!(row = cell.row, error = %e, "heat map skipped"),
            }
        }
    }
    if let Some(heat_map) = store.heat_map(&cell.field.name) {
        match heat_map.color_for(cell.value) {
            Ok(Some(color)) => style.background = Some(color),
            Ok(None) => {}
            Err(e) => tracing::warn!(row = cell.row, error = %e, "heat map skipped"),
        }
    }
}

fn apply_highlight(
    highlight: &RegisteredHighlight,
    value: Option<&Value>,
    cell: &CellContext<'_>,
    style: &mut StyleResult,
) {
    match highlight.matches(value) {
        Ok(true) => highlight.criterion.apply_to(style),
        Ok(false) => {}
        Err(e) => tracing::warn!(
            criterion = %highlight.id,
            field = %cell.field.name,
            row = cell.row,
            error = %e,
            "highlight skipped"
        ),
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
    use crate::color::{Palette, Rgb};
    use crate::criteria::HighlightCriterion;
    use crate::predicate::{ComparisonOperator, Predicate};
    use crate::types::{FieldType, FormatTag};

    fn pipeline() -> StylingPipeline {
        StylingPipeline::new(EngineConfig::default())
    }

    #[test]
    fn test_parity_background() {
        let store = CriterionStore::new();
        let field = Field::new("gene", FieldType::Text);
        let value = Value::from("BRCA1");
        let even = pipeline().compute_style(&store, &CellContext::new(0, &field, Some(&value)));
        let odd = pipeline().compute_style(&store, &CellContext::new(1, &field, Some(&value)));
        assert_eq!(even.style.background, Some(Rgb::new(0xFF, 0xE0, 0xB2)));
        assert_eq!(odd.style.background, Some(Rgb::new(0xFF, 0xF3, 0xE0)));
        assert_eq!(even.text, "BRCA1");
        assert_eq!(even.style.foreground, None);
    }

    #[test]
    fn test_allele_count_warning() {
        let store = CriterionStore::new();
        let field = Field::new("allele_num", FieldType::Integer);
        let three = Value::Integer(3);
        let two = Value::Integer(2);
        let warned = pipeline().compute_style(&store, &CellContext::new(0, &field, Some(&three)));
        assert_eq!(warned.style.background, Some(Rgb::RED));
        let fine = pipeline().compute_style(&store, &CellContext::new(0, &field, Some(&two)));
        assert_ne!(fine.style.background, Some(Rgb::RED));
    }

    #[test]
    fn test_unparsable_allele_count_ignored() {
        let store = CriterionStore::new();
        let field = Field::new("allele_num", FieldType::Text);
        let value = Value::from("three");
        let cell = pipeline().compute_style(&store, &CellContext::new(0, &field, Some(&value)));
        assert_eq!(cell.style.background, Some(Palette::Orange.row_color(0)));
    }

    #[test]
    fn test_percent_display_keeps_raw_for_rules() {
        let mut store = CriterionStore::new();
        let field = Field::new("af", FieldType::Double).with_tag(FormatTag::Percent2);
        store
            .add_highlight(
                HighlightCriterion::cell(
                    field.clone(),
                    Predicate::compare(ComparisonOperator::Smaller, ["0.2"]),
                )
                .bold(),
            )
            .unwrap();
        let value = Value::Double(0.1234);
        let cell = pipeline().compute_style(&store, &CellContext::new(0, &field, Some(&value)));
        assert_eq!(cell.text, "12.34%");
        assert!(cell.style.bold);
    }

    #[test]
    fn test_null_value_shows_empty_text() {
        let store = CriterionStore::new();
        let field = Field::new("evaluation", FieldType::Vocabulary);
        let cell = pipeline().compute_style(&store, &CellContext::new(2, &field, None));
        assert_eq!(cell.text, "");
        assert_eq!(cell.style.background, Some(Palette::Orange.row_color(2)));
    }

    #[test]
    fn test_related_row_not_applied_to_selected() {
        let store = CriterionStore::new();
        let field = Field::new("gene", FieldType::Text);
        let groups = SelectedGroups::new(["X"]);
        let related = CellContext::new(1, &field, None).grouped(Some("X"), Some(&groups));
        let styled = pipeline().compute_style(&store, &related);
        assert_eq!(styled.style.background, Some(Palette::Purple.row_color(1)));
        let styled = pipeline().compute_style(&store, &related.selected(true));
        assert_eq!(styled.style.background, Some(Rgb::new(51, 153, 255)));
    }
}
