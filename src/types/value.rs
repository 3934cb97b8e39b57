use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::{FieldType, OrderKind};

/// A raw, unformatted cell value. Null is represented as `Option::None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Double(f64),
    Timestamp(NaiveDateTime),
    Text(String),
}

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse the timestamp notations found in exported tables and rule files.
///
/// RFC 3339 inputs carrying an offset are normalized to UTC.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") || s == "1" {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") || s == "0" {
        Some(false)
    } else {
        None
    }
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::Timestamp(_) => "timestamp",
            Self::Text(_) => "string",
        }
    }

    /// Parse text into the given field type. Returns None when the text does
    /// not represent a value of that type.
    pub fn coerce(text: &str, field_type: FieldType) -> Option<Self> {
        let t = text.trim();
        match field_type {
            FieldType::Boolean => parse_bool(t).map(Self::Boolean),
            FieldType::Integer => t.parse().ok().map(Self::Integer),
            FieldType::Long => t.parse().ok().map(Self::Long),
            FieldType::Double => t.parse().ok().map(Self::Double),
            FieldType::Timestamp => parse_timestamp(t).map(Self::Timestamp),
            FieldType::Text | FieldType::Vocabulary => Some(Self::Text(text.to_string())),
        }
    }

    /// Convert a JSON cell into a typed value for the given field.
    /// JSON `null` maps to `Ok(None)`.
    pub fn from_json(
        json: &serde_json::Value,
        field_type: FieldType,
    ) -> std::result::Result<Option<Self>, String> {
        use serde_json::Value as Json;
        let typed = match (json, field_type) {
            (Json::Null, _) => return Ok(None),
            (Json::Bool(b), FieldType::Boolean) => Some(Self::Boolean(*b)),
            (Json::Number(n), FieldType::Integer) => n
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(Self::Integer),
            (Json::Number(n), FieldType::Long) => n.as_i64().map(Self::Long),
            (Json::Number(n), FieldType::Double) => n.as_f64().map(Self::Double),
            (Json::String(s), ft) => Self::coerce(s, ft),
            (Json::Bool(b), FieldType::Text | FieldType::Vocabulary) => {
                Some(Self::Text(b.to_string()))
            }
            (Json::Number(n), FieldType::Text | FieldType::Vocabulary) => {
                Some(Self::Text(n.to_string()))
            }
            _ => None,
        };
        typed
            .map(Some)
            .ok_or_else(|| format!("{json} is not a valid {field_type}"))
    }

    /// Numeric view used by display formatting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(f64::from(*v)),
            #[allow(clippy::cast_precision_loss)]
            Self::Long(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Boolean(_) | Self::Timestamp(_) => None,
        }
    }

    /// Project the value into the comparator for `kind`.
    ///
    /// Text values are parsed; numeric variants widen to float. Returns None
    /// when the value cannot be ordered that way.
    pub fn to_orderable(&self, kind: OrderKind) -> Option<Orderable> {
        match (kind, self) {
            (OrderKind::Text, v) => Some(Orderable::Text(v.to_string())),
            (OrderKind::Bool, Self::Boolean(b)) => Some(Orderable::Bool(*b)),
            (OrderKind::Bool, Self::Text(s)) => parse_bool(s).map(Orderable::Bool),
            (OrderKind::Int, Self::Integer(v)) => Some(Orderable::Int(i64::from(*v))),
            (OrderKind::Int, Self::Long(v)) => Some(Orderable::Int(*v)),
            (OrderKind::Int, Self::Text(s)) => s.trim().parse().ok().map(Orderable::Int),
            (OrderKind::Float, Self::Double(v)) => Some(Orderable::Float(*v)),
            (OrderKind::Float, Self::Integer(v)) => Some(Orderable::Float(f64::from(*v))),
            #[allow(clippy::cast_precision_loss)]
            (OrderKind::Float, Self::Long(v)) => Some(Orderable::Float(*v as f64)),
            (OrderKind::Float, Self::Text(s)) => s.trim().parse().ok().map(Orderable::Float),
            (OrderKind::Time, Self::Timestamp(t)) => Some(Orderable::Time(*t)),
            (OrderKind::Time, Self::Text(s)) => parse_timestamp(s).map(Orderable::Time),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(t: NaiveDateTime) -> Self {
        Self::Timestamp(t)
    }
}

/// A value projected into one of the closed set of orderings.
///
/// All variants in one domain share the same kind; mixed kinds order by
/// variant position and have zero distance.
#[derive(Debug, Clone)]
pub enum Orderable {
    Bool(bool),
    Int(i64),
    Float(f64),
    Time(NaiveDateTime),
    Text(String),
}

impl Orderable {
    /// The value a degenerate (all-null) range collapses to.
    pub fn zero(kind: OrderKind) -> Self {
        match kind {
            OrderKind::Bool => Self::Bool(false),
            OrderKind::Int => Self::Int(0),
            OrderKind::Float => Self::Float(0.0),
            OrderKind::Time => Self::Time(NaiveDateTime::default()),
            OrderKind::Text => Self::Text(String::new()),
        }
    }

    pub const fn kind(&self) -> OrderKind {
        match self {
            Self::Bool(_) => OrderKind::Bool,
            Self::Int(_) => OrderKind::Int,
            Self::Float(_) => OrderKind::Float,
            Self::Time(_) => OrderKind::Time,
            Self::Text(_) => OrderKind::Text,
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Int(_) => 1,
            Self::Float(_) => 2,
            Self::Time(_) => 3,
            Self::Text(_) => 4,
        }
    }

    /// Signed distance `self - origin` in the ordering's natural unit:
    /// numeric difference, milliseconds for timestamps, and for text the code
    /// point difference at the first differing position (else the length
    /// difference).
    #[allow(clippy::cast_precision_loss)]
    pub fn offset_from(&self, origin: &Self) -> f64 {
        match (self, origin) {
            (Self::Bool(a), Self::Bool(b)) => f64::from(u8::from(*a)) - f64::from(u8::from(*b)),
            (Self::Int(a), Self::Int(b)) => (i128::from(*a) - i128::from(*b)) as f64,
            (Self::Float(a), Self::Float(b)) => a - b,
            (Self::Time(a), Self::Time(b)) => {
                a.signed_duration_since(*b).num_milliseconds() as f64
            }
            (Self::Text(a), Self::Text(b)) => f64::from(text_offset(a, b)),
            _ => 0.0,
        }
    }
}

/// Lexicographic distance between two strings.
fn text_offset(a: &str, b: &str) -> i32 {
    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca != cb {
            #[allow(clippy::cast_possible_wrap)]
            return ca as i32 - cb as i32;
        }
    }
    let (la, lb) = (a.chars().count(), b.chars().count());
    match la.cmp(&lb) {
        Ordering::Equal => 0,
        Ordering::Less => i32::try_from(lb - la).map_or(i32::MIN, |d| -d),
        Ordering::Greater => i32::try_from(la - lb).unwrap_or(i32::MAX),
    }
}

impl Ord for Orderable {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Orderable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Orderable {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Orderable {}

impl fmt::Display for Orderable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Time(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Self::Text(s) => f.write_str(s),
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

    #[test]
    fn test_coerce_by_field_type() {
        assert_eq!(
            Value::coerce("42", FieldType::Integer),
            Some(Value::Integer(42))
        );
        assert_eq!(
            Value::coerce("TRUE", FieldType::Boolean),
            Some(Value::Boolean(true))
        );
        assert_eq!(Value::coerce("4x", FieldType::Long), None);
        assert_eq!(
            Value::coerce("validated", FieldType::Vocabulary),
            Some(Value::Text("validated".to_string()))
        );
    }

    #[test]
    fn test_parse_timestamp_notations() {
        let expected = NaiveDate::from_ymd_opt(2020, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2020-03-01 12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2020-03-01T12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2020-03-01T13:30:00+01:00"), Some(expected));
        assert!(parse_timestamp("2020-03-01").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_timestamp_serde() {
        let v = Value::Timestamp(parse_timestamp("2020-03-01 12:30:00").unwrap());
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"2020-03-01T12:30:00\"");
        assert_eq!(serde_json::from_str::<Value>(&json).unwrap(), v);
    }

    #[test]
    fn test_from_json() {
        let v = Value::from_json(&serde_json::json!(3), FieldType::Double).unwrap();
        assert_eq!(v, Some(Value::Double(3.0)));
        let v = Value::from_json(&serde_json::Value::Null, FieldType::Integer).unwrap();
        assert_eq!(v, None);
        assert!(Value::from_json(&serde_json::json!(true), FieldType::Integer).is_err());
    }

    #[test]
    fn test_orderable_total_order() {
        let mut values = vec![
            Orderable::Float(2.5),
            Orderable::Float(-1.0),
            Orderable::Float(0.0),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Orderable::Float(-1.0),
                Orderable::Float(0.0),
                Orderable::Float(2.5)
            ]
        );
    }

    #[test]
    fn test_text_offset() {
        let a = Orderable::Text("b".to_string());
        let b = Orderable::Text("a".to_string());
        assert_eq!(a.offset_from(&b), 1.0);
        let a = Orderable::Text("abc".to_string());
        let b = Orderable::Text("a".to_string());
        assert_eq!(a.offset_from(&b), 2.0);
        assert_eq!(b.offset_from(&a), -2.0);
    }

    #[test]
    fn test_time_offset_in_millis() {
        let a = parse_timestamp("2020-01-01 00:00:01").unwrap();
        let b = parse_timestamp("2020-01-01 00:00:00").unwrap();
        assert_eq!(Orderable::Time(a).offset_from(&Orderable::Time(b)), 1000.0);
    }

    #[test]
    fn test_integer_widens_to_float() {
        let v = Value::Integer(3);
        assert_eq!(
            v.to_orderable(OrderKind::Float),
            Some(Orderable::Float(3.0))
        );
        assert!(Value::Boolean(true).to_orderable(OrderKind::Int).is_none());
    }
}
