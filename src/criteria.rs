//! User-defined styling criteria.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::color::Rgb;
use crate::error::{Result, StyleError};
use crate::heatmap::{ColorRange, ConversionMethod};
use crate::predicate::Predicate;
use crate::types::{Field, StyleResult};

/// Identifier handed out by the store when a highlight is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CriterionId(pub u64);

impl fmt::Display for CriterionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a highlight styles the whole row or only the matching cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Row,
    #[default]
    Cell,
}

/// Conditional emphasis: when the predicate matches, the attributes that are
/// set here override the cell's current style.
#[derive(Debug, Clone)]
pub struct HighlightCriterion {
    pub scope: Scope,
    /// Field whose value is tested. Required for cell scope; a row criterion
    /// without a field tests every cell it styles.
    pub field: Option<Field>,
    pub predicate: Predicate,
    pub background: Option<Rgb>,
    pub foreground: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
}

impl HighlightCriterion {
    pub fn cell(field: Field, predicate: Predicate) -> Self {
        Self {
            scope: Scope::Cell,
            field: Some(field),
            predicate,
            background: None,
            foreground: None,
            bold: false,
            italic: false,
        }
    }

    pub fn row(field: Option<Field>, predicate: Predicate) -> Self {
        Self {
            scope: Scope::Row,
            field,
            predicate,
            background: None,
            foreground: None,
            bold: false,
            italic: false,
        }
    }

    #[must_use]
    pub fn with_background(mut self, color: Rgb) -> Self {
        self.background = Some(color);
        self
    }

    #[must_use]
    pub fn with_foreground(mut self, color: Rgb) -> Self {
        self.foreground = Some(color);
        self
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn field_name(&self) -> Option<&str> {
        self.field.as_ref().map(|f| f.name.as_str())
    }

    /// Structural checks that do not depend on the predicate.
    pub(crate) fn check_shape(&self) -> Result<()> {
        if self.scope == Scope::Cell && self.field.is_none() {
            return Err(StyleError::configuration(
                "cell highlight criteria must be bound to a field",
            ));
        }
        Ok(())
    }

    /// Overlay the attributes this criterion defines.
    pub fn apply_to(&self, style: &mut StyleResult) {
        if let Some(bg) = self.background {
            style.background = Some(bg);
        }
        if let Some(fg) = self.foreground {
            style.foreground = Some(fg);
        }
        style.bold |= self.bold;
        style.italic |= self.italic;
    }
}

impl fmt::Display for HighlightCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {{",
            self.field_name().unwrap_or("any field"),
            self.predicate
        )?;
        let mut parts = Vec::new();
        if let Some(bg) = self.background {
            parts.push(format!("bg {bg}"));
        }
        if let Some(fg) = self.foreground {
            parts.push(format!("fg {fg}"));
        }
        if self.bold {
            parts.push("bold".to_string());
        }
        if self.italic {
            parts.push("italic".to_string());
        }
        parts.push(
            match self.scope {
                Scope::Row => "row",
                Scope::Cell => "cell",
            }
            .to_string(),
        );
        write!(f, "{}}}", parts.join(", "))
    }
}

/// Gradient coloring of one field. At most one per field name is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatMapCriterion {
    pub field: Field,
    pub color_range: ColorRange,
    pub conversion: ConversionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<String>,
    /// Color every cell of the row with this field's gradient color.
    #[serde(default)]
    pub expand_row: bool,
}

impl HeatMapCriterion {
    pub fn new(field: Field, color_range: ColorRange, conversion: ConversionMethod) -> Self {
        Self {
            field,
            color_range,
            conversion,
            minimum: None,
            maximum: None,
            expand_row: false,
        }
    }

    /// Explicit bounds, parsed as the field's type at registration.
    #[must_use]
    pub fn with_bounds(mut self, minimum: impl Into<String>, maximum: impl Into<String>) -> Self {
        self.conversion = ConversionMethod::RangeGiven;
        self.minimum = Some(minimum.into());
        self.maximum = Some(maximum.into());
        self
    }

    #[must_use]
    pub fn expanding(mut self) -> Self {
        self.expand_row = true;
        self
    }
}

impl fmt::Display for HeatMapCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.field.name, self.conversion)?;
        if self.conversion == ConversionMethod::RangeGiven {
            write!(
                f,
                " [{}, {}]",
                self.minimum.as_deref().unwrap_or("?"),
                self.maximum.as_deref().unwrap_or("?")
            )?;
        }
        write!(f, ", {}", self.color_range)?;
        if self.expand_row {
            f.write_str(", whole row")?;
        }
        f.write_str(")")
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

    #[test]
    fn test_highlight_display() {
        let c = HighlightCriterion::cell(
            Field::new("depth", FieldType::Integer),
            Predicate::compare(ComparisonOperator::Greater, ["20"]),
        )
        .with_background(Rgb::RED)
        .bold();
        assert_eq!(c.to_string(), "depth > 20 {bg #FF0000, bold, cell}");
    }

    #[test]
    fn test_heat_map_display() {
        let c = HeatMapCriterion::new(
            Field::new("af", FieldType::Double),
            ColorRange::HsvBlueToRed,
            ConversionMethod::RangeData,
        );
        assert_eq!(c.to_string(), "af (estimated range, HSV_BLUE_TO_RED)");
        let given = c.with_bounds("0", "1").expanding();
        assert_eq!(
            given.to_string(),
            "af (given range [0, 1], HSV_BLUE_TO_RED, whole row)"
        );
    }

    #[test]
    fn test_apply_only_sets_defined_attributes() {
        let c = HighlightCriterion::row(None, Predicate::custom(|_| Ok(true))).italic();
        let mut style = StyleResult::on(Rgb::WHITE);
        style.bold = true;
        c.apply_to(&mut style);
        assert_eq!(style.background, Some(Rgb::WHITE));
        assert!(style.bold);
        assert!(style.italic);
    }

    #[test]
    fn test_cell_scope_requires_field() {
        let mut c = HighlightCriterion::row(None, Predicate::custom(|_| Ok(true)));
        c.scope = Scope::Cell;
        assert!(c.check_shape().is_err());
    }
}
