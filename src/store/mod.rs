//! Criterion storage for one table context
//!
//! The store owns every highlight and heat-map criterion for the table it is
//! bound to, together with the heat-map domains derived from that table.
//! Registration validates criteria and builds domains up front, so styling a
//! cell never fails because of a configuration problem. Every mutation is
//! broadcast to the registered render targets so they can repaint.

pub mod commands;

use std::fmt;
use std::sync::Arc;

use crate::color::Rgb;
use crate::criteria::{CriterionId, HeatMapCriterion, HighlightCriterion, Scope};
use crate::error::{Result, StyleError};
use crate::heatmap::{self, compute_domain, ColorDomain};
use crate::predicate::CompiledPredicate;
use crate::table::TableSource;
use crate::types::{Field, Value};

pub use commands::{criterion_channel, CriterionCommand, PendingCommands, StoreHandle};

/// A table shared between the store and the code that owns the data.
pub type SharedTable = Arc<dyn TableSource + Send + Sync>;

/// Why render targets are asked to repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepaintReason {
    HighlightsChanged,
    HeatMapsChanged,
    DatasetReplaced,
}

type RenderCallback = Box<dyn Fn(RepaintReason) + Send + Sync>;

/// A highlight accepted by the store, with its predicate compiled against
/// the bound field.
#[derive(Debug, Clone)]
pub struct RegisteredHighlight {
    pub id: CriterionId,
    pub criterion: HighlightCriterion,
    predicate: CompiledPredicate,
}

impl RegisteredHighlight {
    /// # Errors
    /// `Evaluation` when the value cannot be tested.
    pub fn matches(&self, value: Option<&Value>) -> Result<bool> {
        self.predicate.matches(value)
    }
}

/// A heat map accepted by the store with its current domain.
#[derive(Debug, Clone)]
pub struct RegisteredHeatMap {
    pub criterion: HeatMapCriterion,
    domain: Option<ColorDomain>,
}

impl RegisteredHeatMap {
    /// `None` until a dataset is bound, for data-driven conversions.
    pub const fn domain(&self) -> Option<&ColorDomain> {
        self.domain.as_ref()
    }

    /// Gradient color for one raw value; `Ok(None)` for null or when the
    /// domain is not built yet.
    ///
    /// # Errors
    /// `Evaluation` when the value cannot be ordered like the field.
    pub fn color_for(&self, value: Option<&Value>) -> Result<Option<Rgb>> {
        let Some(domain) = &self.domain else {
            return Ok(None);
        };
        match (value, heatmap::color_for(value, domain, self.criterion.color_range)) {
            (Some(value), None) => {
                let field = &self.criterion.field;
                Err(StyleError::evaluation(
                    &field.name,
                    format!(
                        "cannot place {} '{value}' on a {} gradient",
                        value.type_name(),
                        field.field_type
                    ),
                ))
            }
            (_, color) => Ok(color),
        }
    }
}

/// `TypeMismatch` when `dataset` has a column named like `field` but of
/// another type. Columns the dataset lacks are not checked.
fn check_column_type(field: &Field, dataset: Option<&SharedTable>) -> Result<()> {
    let Some(column) =
        dataset.and_then(|table| table.column_of(&field.name).and_then(|col| table.field_at(col)))
    else {
        return Ok(());
    };
    if column.field_type == field.field_type {
        return Ok(());
    }
    Err(StyleError::type_mismatch(
        &field.name,
        format!("a {} column", field.field_type),
        format!("a {} column", column.field_type),
    ))
}

fn build_domain(
    criterion: &HeatMapCriterion,
    dataset: Option<&SharedTable>,
) -> Result<Option<ColorDomain>> {
    let field = &criterion.field;
    let min = criterion.minimum.as_deref();
    let max = criterion.maximum.as_deref();
    if !criterion.conversion.needs_data() {
        return compute_domain(field, std::iter::empty(), criterion.conversion, min, max).map(Some);
    }
    let Some(table) = dataset else {
        return Ok(None);
    };
    let values = table
        .column_of(&field.name)
        .map(|col| table.column_values(col))
        .unwrap_or_default();
    let domain = compute_domain(field, values, criterion.conversion, min, max)?;
    tracing::debug!(
        field = %field.name,
        method = %criterion.conversion,
        size = domain.len(),
        "heat map domain built"
    );
    Ok(Some(domain))
}

/// Criteria, domains and render targets of one table context.
#[derive(Default)]
pub struct CriterionStore {
    highlights: Vec<RegisteredHighlight>,
    heat_maps: Vec<RegisteredHeatMap>,
    next_id: u64,
    dataset: Option<SharedTable>,
    targets: Vec<(String, RenderCallback)>,
}

impl fmt::Debug for CriterionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CriterionStore")
            .field("highlights", &self.highlights.len())
            .field("heat_maps", &self.heat_maps.len())
            .field("dataset_rows", &self.dataset.as_ref().map(|t| t.row_count()))
            .field("targets", &self.targets.len())
            .finish()
    }
}

impl CriterionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- highlights ---

    /// Validate and register a highlight. Later registrations win per
    /// attribute over earlier ones.
    ///
    /// # Errors
    /// `Configuration` or `TypeMismatch` when the criterion cannot be
    /// evaluated on its field, or `TypeMismatch` when the bound dataset
    /// types that field differently. The store is left unchanged.
    pub fn add_highlight(&mut self, criterion: HighlightCriterion) -> Result<CriterionId> {
        criterion.check_shape()?;
        if let Some(field) = &criterion.field {
            check_column_type(field, self.dataset.as_ref())?;
        }
        let predicate = criterion.predicate.compile(criterion.field.as_ref())?;
        self.next_id += 1;
        let id = CriterionId(self.next_id);
        tracing::debug!(%id, criterion = %criterion, "highlight registered");
        self.highlights.push(RegisteredHighlight {
            id,
            criterion,
            predicate,
        });
        self.broadcast(RepaintReason::HighlightsChanged);
        Ok(id)
    }

    pub fn remove_highlight(&mut self, id: CriterionId) -> bool {
        let before = self.highlights.len();
        self.highlights.retain(|h| h.id != id);
        let removed = self.highlights.len() != before;
        if removed {
            self.broadcast(RepaintReason::HighlightsChanged);
        }
        removed
    }

    pub fn clear_highlights(&mut self) {
        self.highlights.clear();
        self.broadcast(RepaintReason::HighlightsChanged);
    }

    /// All highlights in registration order.
    pub fn highlights(&self) -> &[RegisteredHighlight] {
        &self.highlights
    }

    pub fn highlight(&self, id: CriterionId) -> Option<&RegisteredHighlight> {
        self.highlights.iter().find(|h| h.id == id)
    }

    /// Row-scoped highlights in registration order.
    pub fn row_highlights(&self) -> impl Iterator<Item = &RegisteredHighlight> {
        self.highlights
            .iter()
            .filter(|h| h.criterion.scope == Scope::Row)
    }

    /// Cell-scoped highlights bound to `field_name`, in registration order.
    pub fn cell_highlights<'a>(
        &'a self,
        field_name: &'a str,
    ) -> impl Iterator<Item = &'a RegisteredHighlight> + 'a {
        self.highlights.iter().filter(move |h| {
            h.criterion.scope == Scope::Cell && h.criterion.field_name() == Some(field_name)
        })
    }

    // --- heat maps ---

    /// Register a heat map, replacing any heat map on the same field, and
    /// build its domain against the bound dataset.
    ///
    /// # Errors
    /// `Configuration` for bad explicit bounds, `TypeMismatch` when the
    /// dataset column has another type or holds values that do not fit it. The store is left
    /// unchanged.
    pub fn add_heat_map(&mut self, criterion: HeatMapCriterion) -> Result<()> {
        check_column_type(&criterion.field, self.dataset.as_ref())?;
        let domain = build_domain(&criterion, self.dataset.as_ref())?;
        tracing::debug!(criterion = %criterion, "heat map registered");
        self.heat_maps
            .retain(|h| h.criterion.field.name != criterion.field.name);
        self.heat_maps.push(RegisteredHeatMap { criterion, domain });
        self.broadcast(RepaintReason::HeatMapsChanged);
        Ok(())
    }

    pub fn remove_heat_map(&mut self, field_name: &str) -> bool {
        let before = self.heat_maps.len();
        self.heat_maps.retain(|h| h.criterion.field.name != field_name);
        let removed = self.heat_maps.len() != before;
        if removed {
            self.broadcast(RepaintReason::HeatMapsChanged);
        }
        removed
    }

    pub fn clear_heat_maps(&mut self) {
        self.heat_maps.clear();
        self.broadcast(RepaintReason::HeatMapsChanged);
    }

    /// All heat maps in registration order.
    pub fn heat_maps(&self) -> &[RegisteredHeatMap] {
        &self.heat_maps
    }

    pub fn heat_map(&self, field_name: &str) -> Option<&RegisteredHeatMap> {
        self.heat_maps
            .iter()
            .find(|h| h.criterion.field.name == field_name)
    }

    /// Row-expanding heat maps in registration order.
    pub fn expanding_heat_maps(&self) -> impl Iterator<Item = &RegisteredHeatMap> {
        self.heat_maps.iter().filter(|h| h.criterion.expand_row)
    }

    // --- dataset ---

    /// Bind the table this store styles and rebuild every heat-map domain.
    ///
    /// # Errors
    /// `TypeMismatch` when a registered criterion's field type differs from
    /// the table's column, or the first domain that fails to build. Neither
    /// the dataset nor any domain is changed in that case.
    pub fn bind_dataset(&mut self, source: SharedTable) -> Result<()> {
        let fields = self
            .highlights
            .iter()
            .filter_map(|h| h.criterion.field.as_ref())
            .chain(self.heat_maps.iter().map(|h| &h.criterion.field));
        for field in fields {
            check_column_type(field, Some(&source))?;
        }
        let domains = self
            .heat_maps
            .iter()
            .map(|h| build_domain(&h.criterion, Some(&source)))
            .collect::<Result<Vec<_>>>()?;
        for (heat_map, domain) in self.heat_maps.iter_mut().zip(domains) {
            heat_map.domain = domain;
        }
        tracing::debug!(
            rows = source.row_count(),
            heat_maps = self.heat_maps.len(),
            "dataset bound"
        );
        self.dataset = Some(source);
        self.broadcast(RepaintReason::DatasetReplaced);
        Ok(())
    }

    /// Swap in a new dataset (new query results, reloaded table).
    ///
    /// # Errors
    /// See [`CriterionStore::bind_dataset`].
    pub fn replace_dataset(&mut self, source: SharedTable) -> Result<()> {
        self.bind_dataset(source)
    }

    /// Drop the dataset; data-driven heat maps lose their domains.
    pub fn unbind_dataset(&mut self) {
        self.dataset = None;
        for heat_map in &mut self.heat_maps {
            if heat_map.criterion.conversion.needs_data() {
                heat_map.domain = None;
            }
        }
        self.broadcast(RepaintReason::DatasetReplaced);
    }

    pub fn dataset(&self) -> Option<&SharedTable> {
        self.dataset.as_ref()
    }

    // --- render targets ---

    /// Register a callback invoked after every store mutation. A target
    /// registered again under the same key replaces the previous callback.
    pub fn register_render_target<F>(&mut self, key: impl Into<String>, callback: F)
    where
        F: Fn(RepaintReason) + Send + Sync + 'static,
    {
        let key = key.into();
        self.targets.retain(|(k, _)| *k != key);
        self.targets.push((key, Box::new(callback)));
    }

    pub fn unregister_render_target(&mut self, key: &str) -> bool {
        let before = self.targets.len();
        self.targets.retain(|(k, _)| k != key);
        self.targets.len() != before
    }

    pub fn render_target_count(&self) -> usize {
        self.targets.len()
    }

    fn broadcast(&self, reason: RepaintReason) {
        for (_, callback) in &self.targets {
            callback(reason);
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
    use crate::heatmap::{ColorRange, ConversionMethod};
    use crate::predicate::{ComparisonOperator, Predicate};
    use crate::table::MemoryTable;
    use crate::types::{Field, FieldType};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn depth() -> Field {
        Field::new("depth", FieldType::Integer)
    }

    fn table() -> SharedTable {
        let mut t = MemoryTable::new(vec![depth()]);
        for d in [5, 10, 15] {
            t.push_row(vec![Some(Value::Integer(d))]).unwrap();
        }
        Arc::new(t)
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = CriterionStore::new();
        let p = Predicate::compare(ComparisonOperator::Greater, ["1"]);
        let a = store
            .add_highlight(HighlightCriterion::cell(depth(), p.clone()))
            .unwrap();
        let b = store
            .add_highlight(HighlightCriterion::cell(depth(), p))
            .unwrap();
        assert_ne!(a, b);
        assert!(store.remove_highlight(a));
        assert!(!store.remove_highlight(a));
        assert_eq!(store.highlights().len(), 1);
    }

    #[test]
    fn test_rejected_highlight_leaves_store_unchanged() {
        let mut store = CriterionStore::new();
        let gene = Field::new("gene", FieldType::Text);
        let bad = HighlightCriterion::cell(
            gene,
            Predicate::compare(ComparisonOperator::Greater, ["A"]),
        );
        assert!(store.add_highlight(bad).is_err());
        assert!(store.highlights().is_empty());
    }

    #[test]
    fn test_heat_map_replaces_same_field() {
        let mut store = CriterionStore::new();
        store
            .add_heat_map(HeatMapCriterion::new(
                depth(),
                ColorRange::HsvBlueToRed,
                ConversionMethod::RangeData,
            ))
            .unwrap();
        store
            .add_heat_map(HeatMapCriterion::new(
                depth(),
                ColorRange::RgbGreenToRed,
                ConversionMethod::Sorting,
            ))
            .unwrap();
        assert_eq!(store.heat_maps().len(), 1);
        assert_eq!(
            store.heat_map("depth").unwrap().criterion.color_range,
            ColorRange::RgbGreenToRed
        );
    }

    #[test]
    fn test_domain_waits_for_dataset() {
        let mut store = CriterionStore::new();
        store
            .add_heat_map(HeatMapCriterion::new(
                depth(),
                ColorRange::RgbRedToGreen,
                ConversionMethod::RangeData,
            ))
            .unwrap();
        assert!(store.heat_map("depth").unwrap().domain().is_none());
        store.bind_dataset(table()).unwrap();
        let hm = store.heat_map("depth").unwrap();
        let color = hm.color_for(Some(&Value::Integer(15))).unwrap();
        assert_eq!(color, Some(ColorRange::RgbRedToGreen.color_at(1.0)));
    }

    #[test]
    fn test_given_range_built_without_dataset() {
        let mut store = CriterionStore::new();
        store
            .add_heat_map(
                HeatMapCriterion::new(depth(), ColorRange::RgbRedToGreen, ConversionMethod::Sorting)
                    .with_bounds("0", "10"),
            )
            .unwrap();
        let hm = store.heat_map("depth").unwrap();
        assert!(hm.domain().is_some());
        let color = hm.color_for(Some(&Value::Integer(5))).unwrap();
        assert_eq!(color, Some(ColorRange::RgbRedToGreen.color_at(0.5)));
    }

    #[test]
    fn test_color_for_matches_domain_lookup() {
        let mut store = CriterionStore::new();
        store.bind_dataset(table()).unwrap();
        store
            .add_heat_map(HeatMapCriterion::new(
                depth(),
                ColorRange::HsvBlueToRed,
                ConversionMethod::Sorting,
            ))
            .unwrap();
        let hm = store.heat_map("depth").unwrap();
        let domain = hm.domain().unwrap();
        for v in [5, 10, 15] {
            let value = Value::Integer(v);
            assert_eq!(
                hm.color_for(Some(&value)).unwrap(),
                heatmap::color_for(Some(&value), domain, ColorRange::HsvBlueToRed)
            );
        }
        assert_eq!(hm.color_for(None).unwrap(), None);
        assert!(matches!(
            hm.color_for(Some(&Value::from("deep"))),
            Err(StyleError::Evaluation { .. })
        ));
    }

    #[test]
    fn test_broadcast_on_mutation() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut store = CriterionStore::new();
        let counter = Arc::clone(&hits);
        store.register_render_target("grid", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        store.clear_highlights();
        store.bind_dataset(table()).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(store.unregister_render_target("grid"));
        store.clear_heat_maps();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
