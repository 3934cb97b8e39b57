//! Rule-set import and export.
//!
//! A [`RuleSet`] is the JSON form of a store's criteria. Only comparison
//! predicates are persisted; custom closures stay in memory.
//!
//! ```json
//! {
//!   "highlights": [
//!     {"scope": "cell", "field": {"name": "depth", "type": "integer"},
//!      "condition": {"operator": "GREATER", "values": ["20"]},
//!      "background": "#FF0000", "bold": true}
//!   ],
//!   "heat_maps": [
//!     {"field": {"name": "af", "type": "double"},
//!      "color_range": "HSV_BLUE_TO_RED", "conversion": "RANGE_DATA"}
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::color::Rgb;
use crate::criteria::{CriterionId, HeatMapCriterion, HighlightCriterion, Scope};
use crate::error::{Result, StyleError};
use crate::predicate::{Condition, Predicate};
use crate::store::CriterionStore;
use crate::types::Field;

/// Persisted heat maps have the same shape as registered ones.
pub type HeatMapRule = HeatMapCriterion;

/// Persisted form of a comparison-based highlight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRule {
    #[serde(default)]
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    pub condition: Condition,
    /// `#RRGGBB`; checked when the rule is applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
}

fn parse_color(text: Option<&str>) -> Result<Option<Rgb>> {
    text.map(|s| {
        Rgb::from_hex(s).ok_or_else(|| StyleError::configuration(format!("invalid color '{s}'")))
    })
    .transpose()
}

impl HighlightRule {
    /// Build the in-memory criterion.
    ///
    /// # Errors
    /// `Configuration` for malformed colors.
    pub fn to_criterion(&self) -> Result<HighlightCriterion> {
        Ok(HighlightCriterion {
            scope: self.scope,
            field: self.field.clone(),
            predicate: Predicate::Compare(self.condition.clone()),
            background: parse_color(self.background.as_deref())?,
            foreground: parse_color(self.foreground.as_deref())?,
            bold: self.bold,
            italic: self.italic,
        })
    }

    /// Persisted form of `criterion`; `None` for custom predicates.
    pub fn from_criterion(criterion: &HighlightCriterion) -> Option<Self> {
        let condition = criterion.predicate.condition()?;
        Some(Self {
            scope: criterion.scope,
            field: criterion.field.clone(),
            condition: condition.clone(),
            background: criterion.background.map(Rgb::to_hex),
            foreground: criterion.foreground.map(Rgb::to_hex),
            bold: criterion.bold,
            italic: criterion.italic,
        })
    }
}

/// All persisted criteria of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub highlights: Vec<HighlightRule>,
    #[serde(default)]
    pub heat_maps: Vec<HeatMapRule>,
}

impl RuleSet {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty() && self.heat_maps.is_empty()
    }

    /// Register every rule, highlights first, in file order.
    ///
    /// Stops at the first rejected rule; rules registered before it stay
    /// registered.
    ///
    /// # Errors
    /// The registration error of the first rejected rule.
    pub fn apply(&self, store: &mut CriterionStore) -> Result<Vec<CriterionId>> {
        let mut ids = Vec::with_capacity(self.highlights.len());
        for rule in &self.highlights {
            ids.push(store.add_highlight(rule.to_criterion()?)?);
        }
        for heat_map in &self.heat_maps {
            store.add_heat_map(heat_map.clone())?;
        }
        tracing::debug!(
            highlights = ids.len(),
            heat_maps = self.heat_maps.len(),
            "rule set applied"
        );
        Ok(ids)
    }

    /// Snapshot of the store's comparison-based criteria.
    pub fn from_store(store: &CriterionStore) -> Self {
        Self {
            highlights: store
                .highlights()
                .iter()
                .filter_map(|h| HighlightRule::from_criterion(&h.criterion))
                .collect(),
            heat_maps: store
                .heat_maps()
                .iter()
                .map(|h| h.criterion.clone())
                .collect(),
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
    use crate::predicate::ComparisonOperator;
    use crate::types::FieldType;

    const RULES: &str = r##"{
        "highlights": [
            {"scope": "cell", "field": {"name": "depth", "type": "integer"},
             "condition": {"operator": "GREATER", "values": ["20"]},
             "background": "#FF0000", "bold": true}
        ],
        "heat_maps": [
            {"field": {"name": "af", "type": "double"},
             "color_range": "HSV_BLUE_TO_RED", "conversion": "RANGE_GIVEN",
             "minimum": "0", "maximum": "1"}
        ]
    }"##;

    #[test]
    fn test_apply_registers_everything() {
        let rules = RuleSet::from_json(RULES).unwrap();
        let mut store = CriterionStore::new();
        let ids = rules.apply(&mut store).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(
            store.highlight(ids[0]).unwrap().criterion.to_string(),
            "depth > 20 {bg #FF0000, bold, cell}"
        );
        assert!(store.heat_map("af").is_some());
    }

    #[test]
    fn test_invalid_color_is_configuration_error() {
        let mut rules = RuleSet::from_json(RULES).unwrap();
        rules.highlights[0].background = Some("crimson".to_string());
        let err = rules.apply(&mut CriterionStore::new()).unwrap_err();
        assert!(matches!(err, StyleError::Configuration { .. }));
    }

    #[test]
    fn test_custom_predicates_are_not_exported() {
        let mut store = CriterionStore::new();
        let field = Field::new("gene", FieldType::Text);
        store
            .add_highlight(HighlightCriterion::cell(
                field.clone(),
                Predicate::custom(|_| Ok(true)),
            ))
            .unwrap();
        store
            .add_highlight(
                HighlightCriterion::cell(
                    field,
                    Predicate::compare(ComparisonOperator::Equal, ["TP53"]),
                )
                .italic(),
            )
            .unwrap();
        let rules = RuleSet::from_store(&store);
        assert_eq!(rules.highlights.len(), 1);
        assert!(rules.highlights[0].italic);
        assert!(rules.heat_maps.is_empty());
    }

    #[test]
    fn test_json_roundtrip() {
        let rules = RuleSet::from_json(RULES).unwrap();
        let back = RuleSet::from_json(&rules.to_json().unwrap()).unwrap();
        assert_eq!(rules, back);
    }

    #[test]
    fn test_keys_are_snake_case() {
        let json = RuleSet::from_json(RULES).unwrap().to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let heat_map = &parsed["heat_maps"][0];
        assert_eq!(heat_map["color_range"], "HSV_BLUE_TO_RED");
        assert!(heat_map.get("expand_row").is_some());
        assert!(parsed.get("heatMaps").is_none());
    }
}
