//! Status vocabulary coloring.
//!
//! Status columns (evaluation, in-silico check, validation, segregation, ...)
//! hold values from small closed vocabularies. Each known word has a fixed
//! background color. Lookup is a case-insensitive exact match and the first
//! entry in table order wins.

use crate::color::Rgb;

/// Severity digits used by the evaluation scale, 5 (most severe) to 1.
pub const SEVERITY_5: Rgb = Rgb::new(192, 0, 0);
pub const SEVERITY_4: Rgb = Rgb::new(228, 108, 10);
pub const SEVERITY_3: Rgb = Rgb::new(112, 48, 160);
pub const SEVERITY_2: Rgb = Rgb::new(79, 129, 189);
pub const SEVERITY_1: Rgb = Rgb::new(0, 176, 80);

/// Ordered lookup table. `SUSPECT` appears twice (in-silico and validation
/// vocabularies); only the first entry is ever reached.
pub const STATUS_VOCABULARY: [(&str, Rgb); 22] = [
    ("true", Rgb::GREEN),
    ("false", Rgb::RED),
    ("OK", Rgb::GREEN),
    ("SUSPECT", Rgb::ORANGE),
    ("NOT_OK", Rgb::RED),
    ("YES", Rgb::GREEN),
    ("NO", Rgb::RED),
    ("VALIDATED", Rgb::GREEN),
    ("SUSPECT", Rgb::ORANGE),
    ("INVALIDATED", Rgb::RED),
    ("SOMATIC", Rgb::GREEN),
    ("DUBIOUS", Rgb::ORANGE),
    ("GERMLINE", Rgb::RED),
    ("COSEG", Rgb::GREEN),
    ("CARRIERS", Rgb::GREEN),
    ("NO_COSEG", Rgb::RED),
    ("NO_COSEG_OTHER", Rgb::RED),
    ("5", SEVERITY_5),
    ("4", SEVERITY_4),
    ("3", SEVERITY_3),
    ("2", SEVERITY_2),
    ("1", SEVERITY_1),
];

/// Background color for a status value, if it belongs to the vocabulary.
pub fn status_color(text: &str) -> Option<Rgb> {
    STATUS_VOCABULARY
        .iter()
        .find(|(word, _)| word.eq_ignore_ascii_case(text))
        .map(|(_, color)| *color)
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
    fn test_case_insensitive() {
        assert_eq!(status_color("validated"), Some(Rgb::GREEN));
        assert_eq!(status_color("Not_Ok"), Some(Rgb::RED));
        assert_eq!(status_color("TRUE"), Some(Rgb::GREEN));
    }

    #[test]
    fn test_severity_digits() {
        assert_eq!(status_color("5"), Some(Rgb::new(192, 0, 0)));
        assert_eq!(status_color("1"), Some(Rgb::new(0, 176, 80)));
    }

    #[test]
    fn test_exact_match_only() {
        assert_eq!(status_color("NOT_CHECKED"), None);
        assert_eq!(status_color(" OK"), None);
        assert_eq!(status_color("55"), None);
    }
}
