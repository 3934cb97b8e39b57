//! Heat-map color gradients
//!
//! A heat map maps a value to a color in two stages: the value is placed in
//! `[0, 1]` against a precomputed [`ColorDomain`], then the ratio is fed to
//! one of four fixed gradients. Domains are built once per structural event
//! (registration, dataset replacement) and reused for every cell.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::color::Rgb;
use crate::error::{Result, StyleError};
use crate::types::{Field, Orderable, Value};

/// Gradient used to color a heat map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorRange {
    RgbGreenToRed,
    RgbRedToGreen,
    HsvBlueToRed,
    HsvRedToBlue,
}

impl ColorRange {
    pub const ALL: [Self; 4] = [
        Self::RgbGreenToRed,
        Self::RgbRedToGreen,
        Self::HsvBlueToRed,
        Self::HsvRedToBlue,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::RgbGreenToRed => "RGB_GREEN_TO_RED",
            Self::RgbRedToGreen => "RGB_RED_TO_GREEN",
            Self::HsvBlueToRed => "HSV_BLUE_TO_RED",
            Self::HsvRedToBlue => "HSV_RED_TO_BLUE",
        }
    }

    /// Ratio used when a range domain collapses to a single point.
    pub const fn best_ratio(self) -> f64 {
        match self {
            Self::HsvBlueToRed | Self::RgbGreenToRed => 0.0,
            Self::HsvRedToBlue | Self::RgbRedToGreen => 1.0,
        }
    }

    /// Gradient color at `ratio` (clamped to `[0, 1]`).
    pub fn color_at(self, ratio: f64) -> Rgb {
        let ratio = if ratio.is_nan() {
            0.0
        } else {
            ratio.clamp(0.0, 1.0)
        };
        match self {
            Self::HsvRedToBlue | Self::HsvBlueToRed => {
                let mut total = ratio * 100.0;
                if self == Self::HsvBlueToRed {
                    total = 100.0 - total;
                }
                #[allow(clippy::cast_possible_truncation)]
                let hue = (total * 0.007) as f32;
                Rgb::from_hsb(hue, 0.9, 0.9)
            }
            Self::RgbRedToGreen | Self::RgbGreenToRed => {
                let (red, green) = rgb_channels(ratio);
                if self == Self::RgbRedToGreen {
                    Rgb::new(red, green, 80)
                } else {
                    Rgb::new(green, red, 80)
                }
            }
        }
    }

    /// Evenly sampled strip of the gradient, from ratio 0 to ratio 1.
    #[allow(clippy::cast_precision_loss)]
    pub fn preview(self, width: usize) -> Vec<Rgb> {
        match width {
            0 => Vec::new(),
            1 => vec![self.color_at(0.0)],
            n => (0..n)
                .map(|i| self.color_at(i as f64 / (n - 1) as f64))
                .collect(),
        }
    }
}

/// Red and green channels of the red-to-green sweep.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rgb_channels(ratio: f64) -> (u8, u8) {
    let t = ratio * 510.0;
    let step = t.floor().clamp(0.0, 510.0) as u16;
    let red = if t <= 255.0 {
        255
    } else {
        255_u16.saturating_sub(step - 255)
    };
    let green = if t < 255.0 { step } else { 255 };
    (red.min(255) as u8, green.min(255) as u8)
}

impl fmt::Display for ColorRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a value is converted into a gradient ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionMethod {
    /// Rank among the distinct observed values.
    Sorting,
    /// Position between the observed minimum and maximum.
    RangeData,
    /// Position between explicit bounds.
    RangeGiven,
}

impl ConversionMethod {
    /// Whether the domain is derived from the dataset.
    pub const fn needs_data(self) -> bool {
        matches!(self, Self::Sorting | Self::RangeData)
    }
}

impl fmt::Display for ConversionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sorting => "sorting",
            Self::RangeData => "estimated range",
            Self::RangeGiven => "given range",
        })
    }
}

/// Precomputed placement data for one heat map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorDomain {
    /// Inclusive bounds; `min == max` is a degenerate domain.
    Range { min: Orderable, max: Orderable },
    /// Distinct observed values in ascending order.
    Ranks(Vec<Orderable>),
}

impl ColorDomain {
    /// Gradient position of an already projected value.
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self, value: &Orderable, range: ColorRange) -> f64 {
        match self {
            Self::Ranks(ranks) => {
                if ranks.len() <= 1 {
                    return 0.0;
                }
                match ranks.binary_search(value) {
                    Ok(index) => index as f64 / (ranks.len() - 1) as f64,
                    Err(_) => 0.0,
                }
            }
            Self::Range { min, max } => {
                let span = max.offset_from(min);
                if span <= 0.0 || min == max {
                    return range.best_ratio();
                }
                (value.offset_from(min) / span).clamp(0.0, 1.0)
            }
        }
    }

    /// The ordering this domain was built under, if it holds any value.
    pub fn kind(&self) -> Option<crate::types::OrderKind> {
        match self {
            Self::Range { min, .. } => Some(min.kind()),
            Self::Ranks(ranks) => ranks.first().map(Orderable::kind),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Range { .. } => 2,
            Self::Ranks(ranks) => ranks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Ranks(ranks) if ranks.is_empty())
    }
}

/// Build the domain of a heat map over `values` (one entry per row, `None`
/// for null cells).
///
/// # Errors
/// `Configuration` when explicit bounds are missing or do not parse as the
/// field's type; `TypeMismatch` when a dataset value does not fit the field.
pub fn compute_domain<'a, I>(
    field: &Field,
    values: I,
    method: ConversionMethod,
    explicit_min: Option<&str>,
    explicit_max: Option<&str>,
) -> Result<ColorDomain>
where
    I: IntoIterator<Item = Option<&'a Value>>,
{
    let kind = field.field_type.order_kind();
    match method {
        ConversionMethod::RangeGiven => {
            let min = parse_bound(field, "minimum", explicit_min)?;
            let max = parse_bound(field, "maximum", explicit_max)?;
            if min > max {
                return Err(StyleError::configuration(format!(
                    "heat map on '{}': minimum {min} is greater than maximum {max}",
                    field.name
                )));
            }
            Ok(ColorDomain::Range { min, max })
        }
        ConversionMethod::RangeData => {
            let mut bounds: Option<(Orderable, Orderable)> = None;
            for value in values.into_iter().flatten() {
                let v = project(field, value)?;
                bounds = Some(match bounds {
                    None => (v.clone(), v),
                    Some((lo, hi)) => {
                        if v < lo {
                            (v, hi)
                        } else if v > hi {
                            (lo, v)
                        } else {
                            (lo, hi)
                        }
                    }
                });
            }
            let (min, max) =
                bounds.unwrap_or_else(|| (Orderable::zero(kind), Orderable::zero(kind)));
            Ok(ColorDomain::Range { min, max })
        }
        ConversionMethod::Sorting => {
            let mut ranks = values
                .into_iter()
                .flatten()
                .map(|v| project(field, v))
                .collect::<Result<Vec<_>>>()?;
            ranks.sort();
            ranks.dedup();
            Ok(ColorDomain::Ranks(ranks))
        }
    }
}

fn project(field: &Field, value: &Value) -> Result<Orderable> {
    value
        .to_orderable(field.field_type.order_kind())
        .ok_or_else(|| {
            StyleError::type_mismatch(
                &field.name,
                field.field_type.name(),
                format!("{} '{value}'", value.type_name()),
            )
        })
}

fn parse_bound(field: &Field, which: &str, bound: Option<&str>) -> Result<Orderable> {
    let text = bound.ok_or_else(|| {
        StyleError::configuration(format!(
            "heat map on '{}' uses a given range but has no {which}",
            field.name
        ))
    })?;
    Value::coerce(text, field.field_type)
        .and_then(|v| v.to_orderable(field.field_type.order_kind()))
        .ok_or_else(|| {
            StyleError::configuration(format!(
                "heat map on '{}': {which} '{text}' is not a valid {}",
                field.name, field.field_type
            ))
        })
}

/// Color of a single value against a domain. Null and values that cannot be
/// ordered like the domain yield `None`.
pub fn color_for(value: Option<&Value>, domain: &ColorDomain, range: ColorRange) -> Option<Rgb> {
    let value = value?;
    let Some(kind) = domain.kind() else {
        // empty ranks: every value sits at the first rank
        return Some(range.color_at(0.0));
    };
    let projected = value.to_orderable(kind)?;
    Some(range.color_at(domain.ratio(&projected, range)))
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

    fn ints(values: &[i32]) -> Vec<Value> {
        values.iter().map(|v| Value::Integer(*v)).collect()
    }

    #[test]
    fn test_rgb_endpoints() {
        assert_eq!(ColorRange::RgbRedToGreen.color_at(0.0), Rgb::new(255, 0, 80));
        assert_eq!(ColorRange::RgbRedToGreen.color_at(1.0), Rgb::new(0, 255, 80));
        assert_eq!(ColorRange::RgbGreenToRed.color_at(0.0), Rgb::new(0, 255, 80));
        assert_eq!(ColorRange::RgbGreenToRed.color_at(1.0), Rgb::new(255, 0, 80));
        assert_eq!(ColorRange::RgbRedToGreen.color_at(0.5), Rgb::new(255, 255, 80));
    }

    #[test]
    fn test_hsv_endpoints() {
        assert_eq!(ColorRange::HsvRedToBlue.color_at(0.0), Rgb::new(230, 23, 23));
        assert_eq!(ColorRange::HsvRedToBlue.color_at(1.0), Rgb::new(64, 23, 230));
        assert_eq!(ColorRange::HsvBlueToRed.color_at(0.0), Rgb::new(64, 23, 230));
        assert_eq!(ColorRange::HsvBlueToRed.color_at(1.0), Rgb::new(230, 23, 23));
    }

    #[test]
    fn test_range_data_tracks_min_max() {
        let field = Field::new("depth", FieldType::Integer);
        let values = ints(&[7, 3, 12, 5]);
        let domain = compute_domain(
            &field,
            values.iter().map(Some),
            ConversionMethod::RangeData,
            None,
            None,
        )
        .unwrap();
        assert_eq!(
            domain,
            ColorDomain::Range {
                min: Orderable::Int(3),
                max: Orderable::Int(12)
            }
        );
    }

    #[test]
    fn test_all_null_column_is_degenerate() {
        let field = Field::new("af", FieldType::Double);
        let domain =
            compute_domain(&field, vec![None, None], ConversionMethod::RangeData, None, None)
                .unwrap();
        let color = color_for(Some(&Value::Double(0.3)), &domain, ColorRange::HsvRedToBlue);
        assert_eq!(color, Some(ColorRange::HsvRedToBlue.color_at(1.0)));
    }

    #[test]
    fn test_sorting_dedups_and_ranks() {
        let field = Field::new("depth", FieldType::Integer);
        let values = ints(&[30, 10, 20, 10]);
        let domain = compute_domain(
            &field,
            values.iter().map(Some).chain([None]),
            ConversionMethod::Sorting,
            None,
            None,
        )
        .unwrap();
        assert_eq!(domain.len(), 3);
        let mid = Orderable::Int(20);
        assert_eq!(domain.ratio(&mid, ColorRange::RgbRedToGreen), 0.5);
        let absent = Orderable::Int(25);
        assert_eq!(domain.ratio(&absent, ColorRange::RgbRedToGreen), 0.0);
    }

    #[test]
    fn test_range_given_rejects_bad_bounds() {
        let field = Field::new("qual", FieldType::Double);
        let err = compute_domain(
            &field,
            Vec::new(),
            ConversionMethod::RangeGiven,
            Some("low"),
            Some("10"),
        )
        .unwrap_err();
        assert!(matches!(err, StyleError::Configuration { .. }));
        let err = compute_domain(&field, Vec::new(), ConversionMethod::RangeGiven, Some("1"), None)
            .unwrap_err();
        assert!(matches!(err, StyleError::Configuration { .. }));
    }

    #[test]
    fn test_mismatched_dataset_value() {
        let field = Field::new("depth", FieldType::Integer);
        let bad = Value::Text("deep".to_string());
        let err = compute_domain(&field, [Some(&bad)], ConversionMethod::Sorting, None, None)
            .unwrap_err();
        assert!(matches!(err, StyleError::TypeMismatch { .. }));
    }

    #[test]
    fn test_preview_spans_endpoints() {
        let strip = ColorRange::RgbGreenToRed.preview(5);
        assert_eq!(strip.len(), 5);
        assert_eq!(strip[0], ColorRange::RgbGreenToRed.color_at(0.0));
        assert_eq!(strip[4], ColorRange::RgbGreenToRed.color_at(1.0));
        assert!(ColorRange::HsvBlueToRed.preview(0).is_empty());
    }

    #[test]
    fn test_null_has_no_color() {
        let domain = ColorDomain::Ranks(vec![Orderable::Int(1)]);
        assert_eq!(color_for(None, &domain, ColorRange::HsvBlueToRed), None);
    }
}
