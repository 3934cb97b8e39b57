use serde::{Deserialize, Serialize};

use super::{Field, FieldType};
use crate::color::Rgb;

/// Visual attributes computed for one cell.
///
/// Built fresh per call and never persisted. `foreground: None` means the
/// surface default text color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
}

impl StyleResult {
    /// Unstyled cell on the given background.
    pub const fn on(background: Rgb) -> Self {
        Self {
            background: Some(background),
            foreground: None,
            bold: false,
            italic: false,
        }
    }

    /// Text color actually drawn.
    pub fn foreground_or_default(&self) -> Rgb {
        self.foreground.unwrap_or(Rgb::BLACK)
    }
}

/// Horizontal alignment of a cell's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Numbers align right, booleans center, everything else left.
    pub const fn for_field(field: &Field) -> Self {
        match field.field_type {
            FieldType::Integer | FieldType::Long | FieldType::Double => Self::Right,
            FieldType::Boolean => Self::Center,
            FieldType::Timestamp | FieldType::Text | FieldType::Vocabulary => Self::Left,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Pipeline output: the style plus the display string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledCell {
    pub style: StyleResult,
    pub text: String,
}
