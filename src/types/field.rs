use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Boolean,
    Integer,
    Long,
    Double,
    Timestamp,
    Text,
    /// Closed set of known values (status columns, enumerations).
    Vocabulary,
}

/// How values of a field type are ordered for comparisons and heat maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderKind {
    Bool,
    Int,
    Float,
    Time,
    Text,
}

impl FieldType {
    /// Comparator table: every field type maps to exactly one ordering.
    pub const fn order_kind(self) -> OrderKind {
        match self {
            Self::Boolean => OrderKind::Bool,
            Self::Integer | Self::Long => OrderKind::Int,
            Self::Double => OrderKind::Float,
            Self::Timestamp => OrderKind::Time,
            Self::Text | Self::Vocabulary => OrderKind::Text,
        }
    }

    /// Whether `<`, `>` and range comparisons are meaningful for this type.
    pub const fn is_ordered(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Long | Self::Double | Self::Timestamp
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Double => "double",
            Self::Timestamp => "timestamp",
            Self::Text => "string",
            Self::Vocabulary => "controlled vocabulary",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display tags attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatTag {
    /// Show as a percentage with at most 0 fraction digits.
    #[serde(rename = "percent-0")]
    Percent0,
    /// Show as a percentage with at most 2 fraction digits.
    #[serde(rename = "percent-2")]
    Percent2,
}

/// A table column identifier with its semantic type and display tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<FormatTag>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: FormatTag) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn has_tag(&self, tag: FormatTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Maximum fraction digits when the field is displayed as a percentage.
    /// `Percent0` wins when both tags are present.
    pub fn percent_digits(&self) -> Option<usize> {
        if self.has_tag(FormatTag::Percent0) {
            Some(0)
        } else if self.has_tag(FormatTag::Percent2) {
            Some(2)
        } else {
            None
        }
    }

    /// Long integer columns are exported with a thousands-grouped number format.
    pub fn is_large_number(&self) -> bool {
        self.field_type == FieldType::Long
    }
}
