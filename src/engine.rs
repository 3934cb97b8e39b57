//! One styling context per table.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::pipeline::{CellContext, SelectedGroups, StylingPipeline};
use crate::store::{CriterionStore, SharedTable};
use crate::types::{StyleResult, StyledCell};

/// A criterion store plus the pipeline that reads it.
///
/// The engine is `Sync`: a spreadsheet export may borrow it from a worker
/// thread while the render thread only reads.
#[derive(Debug, Default)]
pub struct StyleEngine {
    store: CriterionStore,
    pipeline: StylingPipeline,
}

impl StyleEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            store: CriterionStore::new(),
            pipeline: StylingPipeline::new(config),
        }
    }

    /// Engine bound to `table` from the start.
    ///
    /// # Errors
    /// As [`CriterionStore::bind_dataset`].
    pub fn with_dataset(config: EngineConfig, table: SharedTable) -> Result<Self> {
        let mut engine = Self::new(config);
        engine.store.bind_dataset(table)?;
        Ok(engine)
    }

    pub const fn store(&self) -> &CriterionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CriterionStore {
        &mut self.store
    }

    pub const fn config(&self) -> &EngineConfig {
        self.pipeline.config()
    }

    /// Style one cell described by the caller.
    pub fn compute_style(&self, cell: &CellContext<'_>) -> StyledCell {
        self.pipeline.compute_style(&self.store, cell)
    }

    /// Grouping keys of the bound table's selected rows; empty without a
    /// table.
    pub fn selected_groups(&self) -> SelectedGroups {
        self.store
            .dataset()
            .map(|table| SelectedGroups::from_source(table.as_ref()))
            .unwrap_or_default()
    }

    /// Style the cell at (`row`, `col`) of the bound table, reading value,
    /// selection and grouping from it. `None` outside the table.
    pub fn style_table_cell(
        &self,
        row: usize,
        col: usize,
        groups: &SelectedGroups,
    ) -> Option<StyledCell> {
        let table = self.store.dataset()?;
        if row >= table.row_count() {
            return None;
        }
        let field = table.field_at(col)?;
        let key = table.grouping_key(row);
        let cell = CellContext::new(row, field, table.value_at(row, col))
            .selected(table.is_selected(row))
            .grouped(key.as_deref(), Some(groups));
        Some(self.compute_style(&cell))
    }

    /// Style every cell of the bound table, row by row. A column the table
    /// has no field for yields an empty cell on the plain row background.
    pub fn style_table(&self) -> Vec<Vec<StyledCell>> {
        let Some(table) = self.store.dataset() else {
            return Vec::new();
        };
        let groups = self.selected_groups();
        (0..table.row_count())
            .map(|row| {
                (0..table.column_count())
                    .map(|col| {
                        self.style_table_cell(row, col, &groups)
                            .unwrap_or_else(|| self.blank_cell(row))
                    })
                    .collect()
            })
            .collect()
    }

    fn blank_cell(&self, row: usize) -> StyledCell {
        StyledCell {
            style: StyleResult::on(self.config().theme.row_background(row)),
            text: String::new(),
        }
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
    use crate::table::MemoryTable;
    use crate::types::{Field, FieldType, Value};
    use std::sync::Arc;

    fn assert_sync<T: Sync + Send>() {}

    #[test]
    fn test_engine_is_sync() {
        assert_sync::<StyleEngine>();
    }

    #[test]
    fn test_style_table_shape() {
        let mut table = MemoryTable::new(vec![
            Field::new("gene", FieldType::Text),
            Field::new("depth", FieldType::Integer),
        ]);
        table
            .push_row(vec![Some(Value::from("TP53")), Some(Value::Integer(3))])
            .unwrap();
        table.push_row(vec![None, None]).unwrap();
        let engine = StyleEngine::with_dataset(EngineConfig::default(), Arc::new(table)).unwrap();
        let cells = engine.style_table();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].len(), 2);
        assert_eq!(cells[0][0].text, "TP53");
        assert_eq!(cells[1][1].text, "");
        assert!(engine
            .style_table_cell(5, 0, &SelectedGroups::default())
            .is_none());
    }

    #[test]
    fn test_no_dataset() {
        let engine = StyleEngine::default();
        assert!(engine.style_table().is_empty());
        assert!(engine.selected_groups().is_empty());
    }
}
