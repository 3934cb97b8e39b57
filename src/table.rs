//! Tabular data sources
//!
//! The engine never owns table data. It reads values, selection and grouping
//! keys through [`TableSource`]; [`MemoryTable`] is the in-crate
//! implementation used by the CLI and the tests.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Result, StyleError};
use crate::types::{Field, Value};

/// Read access to a table bound to a styling context.
pub trait TableSource {
    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    fn field_at(&self, col: usize) -> Option<&Field>;

    fn value_at(&self, row: usize, col: usize) -> Option<&Value>;

    /// Indices of the currently selected rows, ascending.
    fn selected_rows(&self) -> Vec<usize>;

    /// Key shared by rows that describe the same entity (e.g. one variant
    /// seen in several samples).
    fn grouping_key(&self, row: usize) -> Option<String>;

    fn column_of(&self, name: &str) -> Option<usize> {
        (0..self.column_count()).find(|&c| self.field_at(c).is_some_and(|f| f.name == name))
    }

    fn is_selected(&self, row: usize) -> bool {
        self.selected_rows().binary_search(&row).is_ok()
    }

    /// All values of one column, top to bottom.
    fn column_values(&self, col: usize) -> Vec<Option<&Value>> {
        (0..self.row_count())
            .map(|row| self.value_at(row, col))
            .collect()
    }
}

impl fmt::Debug for dyn TableSource + Send + Sync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TableSource({} rows x {} columns)",
            self.row_count(),
            self.column_count()
        )
    }
}

/// Row-major table held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    fields: Vec<Field>,
    rows: Vec<Vec<Option<Value>>>,
    selected: BTreeSet<usize>,
    group_by: Option<usize>,
}

#[derive(Deserialize)]
struct RawTable {
    fields: Vec<Field>,
    #[serde(default)]
    rows: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    selected: Vec<usize>,
    #[serde(default)]
    group_by: Option<String>,
}

impl MemoryTable {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Load a table from JSON:
    ///
    /// ```json
    /// {"fields": [{"name": "depth", "type": "integer"}],
    ///  "rows": [[12], [null]], "selected": [0], "group_by": "depth"}
    /// ```
    ///
    /// # Errors
    /// `Json` for malformed input, `TypeMismatch` for a cell that does not fit
    /// its column, `Configuration` for ragged rows or unknown columns.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawTable = serde_json::from_str(json)?;
        let mut table = Self::new(raw.fields);
        for (index, raw_row) in raw.rows.iter().enumerate() {
            if raw_row.len() != table.fields.len() {
                return Err(StyleError::configuration(format!(
                    "row {index} has {} cells, expected {}",
                    raw_row.len(),
                    table.fields.len()
                )));
            }
            let row = table
                .fields
                .iter()
                .zip(raw_row)
                .map(|(field, cell)| {
                    Value::from_json(cell, field.field_type).map_err(|found| {
                        StyleError::type_mismatch(&field.name, field.field_type.name(), found)
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            table.rows.push(row);
        }
        for row in raw.selected {
            table.select(row);
        }
        if let Some(name) = raw.group_by {
            table = table.group_by(&name)?;
        }
        Ok(table)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Append a row.
    ///
    /// # Errors
    /// `Configuration` when the row width differs from the column count.
    pub fn push_row(&mut self, row: Vec<Option<Value>>) -> Result<()> {
        if row.len() != self.fields.len() {
            return Err(StyleError::configuration(format!(
                "row has {} cells, expected {}",
                row.len(),
                self.fields.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Use the named column as grouping key.
    ///
    /// # Errors
    /// `Configuration` if no column has that name.
    pub fn group_by(mut self, name: &str) -> Result<Self> {
        let col = self
            .column_of(name)
            .ok_or_else(|| StyleError::configuration(format!("no column named '{name}'")))?;
        self.group_by = Some(col);
        Ok(self)
    }

    /// Mark a row as selected. Out-of-range rows are ignored.
    pub fn select(&mut self, row: usize) {
        if row < self.rows.len() {
            self.selected.insert(row);
        }
    }

    pub fn deselect(&mut self, row: usize) {
        self.selected.remove(&row);
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }
}

impl TableSource for MemoryTable {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.fields.len()
    }

    fn field_at(&self, col: usize) -> Option<&Field> {
        self.fields.get(col)
    }

    fn value_at(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row)?.get(col)?.as_ref()
    }

    fn selected_rows(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    fn is_selected(&self, row: usize) -> bool {
        self.selected.contains(&row)
    }

    fn grouping_key(&self, row: usize) -> Option<String> {
        let col = self.group_by?;
        self.value_at(row, col).map(ToString::to_string)
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
    use crate::types::FieldType;

    const TABLE: &str = r#"{
        "fields": [
            {"name": "variant", "type": "text"},
            {"name": "depth", "type": "integer"},
            {"name": "af", "type": "double", "tags": ["percent-2"]}
        ],
        "rows": [
            ["chr1:100", 12, 0.5],
            ["chr1:100", null, "0.25"],
            ["chr2:7", 40, 1]
        ],
        "selected": [1, 9],
        "group_by": "variant"
    }"#;

    #[test]
    fn test_from_json() {
        let table = MemoryTable::from_json(TABLE).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.value_at(0, 1), Some(&Value::Integer(12)));
        assert_eq!(table.value_at(1, 1), None);
        assert_eq!(table.value_at(1, 2), Some(&Value::Double(0.25)));
        assert_eq!(table.selected_rows(), vec![1]);
        assert_eq!(table.grouping_key(0).as_deref(), Some("chr1:100"));
        assert_eq!(table.column_of("af"), Some(2));
    }

    #[test]
    fn test_from_json_type_mismatch() {
        let json = r#"{"fields": [{"name": "depth", "type": "integer"}], "rows": [["deep"]]}"#;
        let err = MemoryTable::from_json(json).unwrap_err();
        assert!(matches!(err, StyleError::TypeMismatch { .. }));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let mut table = MemoryTable::new(vec![Field::new("a", FieldType::Text)]);
        assert!(table.push_row(vec![None, None]).is_err());
        assert!(table.push_row(vec![Some(Value::from("x"))]).is_ok());
    }
}
