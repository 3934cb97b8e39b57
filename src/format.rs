//! Display strings for cell values.
//!
//! Formatting only changes what is shown. Styling rules always see the raw
//! value.

use crate::error::{Result, StyleError};
use crate::types::{Field, Value};

/// Format a ratio as a percentage with at most `max_fraction_digits`
/// fraction digits, half-even rounding and space-grouped thousands:
/// `0.1234` with 2 digits is `"12.34%"`, `0.5` with 2 digits is `"50%"`.
pub fn format_percent(value: f64, max_fraction_digits: usize) -> String {
    if !value.is_finite() {
        return format!("{}%", value * 100.0);
    }
    let rounded = format!("{:.prec$}", (value * 100.0).abs(), prec = max_fraction_digits.min(10));
    let (int_part, frac_part) = rounded
        .split_once('.')
        .map_or((rounded.as_str(), ""), |(i, f)| (i, f));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}%")
    } else {
        format!("{sign}{grouped}.{frac_part}%")
    }
}

/// The string shown for a cell. Null is the empty string.
///
/// # Errors
/// `Evaluation` when a percent-tagged field holds a non-numeric value.
pub fn display_text(field: &Field, value: Option<&Value>) -> Result<String> {
    let Some(value) = value else {
        return Ok(String::new());
    };
    match field.percent_digits() {
        Some(digits) => value
            .as_f64()
            .map(|v| format_percent(v, digits))
            .ok_or_else(|| {
                StyleError::evaluation(
                    &field.name,
                    format!("cannot show {} '{value}' as a percentage", value.type_name()),
                )
            }),
        None => Ok(value.to_string()),
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
    use crate::types::{FieldType, FormatTag};

    #[test]
    fn test_percent_two_digits() {
        assert_eq!(format_percent(0.1234, 2), "12.34%");
        assert_eq!(format_percent(0.5, 2), "50%");
        assert_eq!(format_percent(0.12345, 2), "12.35%");
        assert_eq!(format_percent(0.001, 2), "0.1%");
    }

    #[test]
    fn test_percent_zero_digits() {
        assert_eq!(format_percent(0.1234, 0), "12%");
        assert_eq!(format_percent(0.996, 0), "100%");
        assert_eq!(format_percent(12.5, 0), "1 250%");
    }

    #[test]
    fn test_percent_negative_and_zero() {
        assert_eq!(format_percent(-0.25, 2), "-25%");
        assert_eq!(format_percent(-0.00001, 2), "0%");
        assert_eq!(format_percent(0.0, 0), "0%");
    }

    #[test]
    fn test_display_text() {
        let af = Field::new("af", FieldType::Double).with_tag(FormatTag::Percent2);
        assert_eq!(
            display_text(&af, Some(&Value::Double(0.1234))).unwrap(),
            "12.34%"
        );
        assert_eq!(display_text(&af, None).unwrap(), "");
        assert!(display_text(&af, Some(&Value::from("n/a"))).is_err());
        let depth = Field::new("depth", FieldType::Integer);
        assert_eq!(
            display_text(&depth, Some(&Value::Integer(42))).unwrap(),
            "42"
        );
    }
}
