//! Engine configuration.
//!
//! Everything here has a working default, so an empty JSON object is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::color::{Palette, Rgb};
use crate::error::{Result, StyleError};

/// Status columns colored through the controlled vocabulary by default.
pub const DEFAULT_STATUS_FIELDS: [&str; 9] = [
    "evaluation",
    "check_insilico",
    "reporting",
    "check_validated_variant",
    "check_somatic_variant",
    "check_segregation",
    "variant_of_interest",
    "gene_of_interest",
    "sample_of_interest",
];

/// XLSX limit on distinct cell formats.
pub const DEFAULT_MAX_CELL_STYLES: usize = 64_000;

/// Fixed colors of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Palette for alternating row backgrounds.
    pub table_palette: Palette,
    /// Palette for rows related to the selection (same grouping key).
    pub related_palette: Palette,
    pub selection: Rgb,
    /// Background for values failing a sanity check.
    pub warning: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            table_palette: Palette::Orange,
            related_palette: Palette::Purple,
            selection: Rgb::new(51, 153, 255),
            warning: Rgb::RED,
        }
    }
}

impl Theme {
    /// Plain row background.
    pub const fn row_background(&self, row: usize) -> Rgb {
        self.table_palette.row_color(row)
    }

    /// Background of a row sharing its grouping key with a selected row.
    pub const fn related_background(&self, row: usize) -> Rgb {
        self.related_palette.row_color(row)
    }
}

/// Settings of one styling engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub theme: Theme,
    /// Fields whose values are looked up in the status vocabulary.
    pub status_fields: Vec<String>,
    /// Integer field flagged with the warning color above 2 (more than two
    /// alleles at a diploid locus).
    pub allele_count_field: Option<String>,
    /// Cap on distinct styles in one spreadsheet export.
    pub max_cell_styles: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            status_fields: DEFAULT_STATUS_FIELDS.iter().map(ToString::to_string).collect(),
            allele_count_field: Some("allele_num".to_string()),
            max_cell_styles: DEFAULT_MAX_CELL_STYLES,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    /// `Json` for malformed input, `Configuration` for invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    ///
    /// # Errors
    /// `Io` when the file cannot be read, otherwise as [`EngineConfig::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// # Errors
    /// `Json` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// # Errors
    /// `Configuration` when `max_cell_styles` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_cell_styles == 0 {
            return Err(StyleError::configuration(
                "max_cell_styles must allow at least the default style",
            ));
        }
        Ok(())
    }

    pub fn is_status_field(&self, name: &str) -> bool {
        self.status_fields.iter().any(|f| f == name)
    }

    pub fn is_allele_count_field(&self, name: &str) -> bool {
        self.allele_count_field.as_deref() == Some(name)
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

    #[test]
    fn test_empty_object_is_default() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.is_status_field("check_segregation"));
        assert!(config.is_allele_count_field("allele_num"));
        assert_eq!(config.theme.selection.to_hex(), "#3399FF");
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_json(
            r##"{"theme": {"table_palette": "Teal", "selection": "#000080"},
                "allele_count_field": null,
                "status_fields": ["evaluation"]}"##,
        )
        .unwrap();
        assert_eq!(config.theme.table_palette, Palette::Teal);
        assert_eq!(config.theme.related_palette, Palette::Purple);
        assert_eq!(config.theme.selection, Rgb::new(0, 0, 128));
        assert_eq!(config.allele_count_field, None);
        assert!(!config.is_status_field("reporting"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(EngineConfig::from_json(r#"{"max_cell_styles": 0}"#).is_err());
        assert!(EngineConfig::from_json(r#"{"theme": {"warning": "red"}}"#).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EngineConfig::default();
        let back = EngineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }
}
