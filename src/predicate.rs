//! Highlight predicates
//!
//! A [`Predicate`] is a pure `value -> bool` test. Comparison predicates are
//! plain data so rule sets can be saved and reloaded; they are checked
//! against the field they are bound to and compiled once, when the criterion
//! is registered. Anything the comparison operators cannot express goes
//! through [`Predicate::custom`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, StyleError};
use crate::types::{Field, FieldType, OrderKind, Orderable, Value};

/// Comparison applied by a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOperator {
    Equal,
    Different,
    Greater,
    GreaterOrEqual,
    Smaller,
    SmallerOrEqual,
    Contains,
    DoesNotContain,
    /// Inclusive lower bound, inclusive upper bound.
    #[serde(rename = "RANGE_II")]
    RangeII,
    /// Inclusive lower bound, exclusive upper bound.
    #[serde(rename = "RANGE_IE")]
    RangeIE,
    /// Exclusive lower bound, inclusive upper bound.
    #[serde(rename = "RANGE_EI")]
    RangeEI,
    /// Exclusive lower bound, exclusive upper bound.
    #[serde(rename = "RANGE_EE")]
    RangeEE,
}

impl ComparisonOperator {
    /// Operators that need a numeric or chronological field.
    pub const fn is_ordered(self) -> bool {
        !matches!(
            self,
            Self::Equal | Self::Different | Self::Contains | Self::DoesNotContain
        )
    }

    pub const fn is_range(self) -> bool {
        matches!(
            self,
            Self::RangeII | Self::RangeIE | Self::RangeEI | Self::RangeEE
        )
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::Different => "!=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Smaller => "<",
            Self::SmallerOrEqual => "<=",
            Self::Contains => "contains",
            Self::DoesNotContain => "does not contain",
            Self::RangeII | Self::RangeIE | Self::RangeEI | Self::RangeEE => "in",
        }
    }
}

/// A serializable comparison against a list of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub operator: ComparisonOperator,
    #[serde(default)]
    pub values: Vec<String>,
    /// Test for null instead: `Equal` matches null, any other operator
    /// matches non-null.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub null_value: bool,
}

impl Condition {
    pub fn new<I, S>(operator: ComparisonOperator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            operator,
            values: values.into_iter().map(Into::into).collect(),
            null_value: false,
        }
    }

    pub const fn is_null() -> Self {
        Self {
            operator: ComparisonOperator::Equal,
            values: Vec::new(),
            null_value: true,
        }
    }

    pub const fn is_not_null() -> Self {
        Self {
            operator: ComparisonOperator::Different,
            values: Vec::new(),
            null_value: true,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ComparisonOperator as Op;
        if self.null_value {
            return f.write_str(if self.operator == Op::Equal {
                "is null"
            } else {
                "is not null"
            });
        }
        let lo = self.values.first().map_or("", String::as_str);
        let hi = self.values.get(1).map_or("", String::as_str);
        match self.operator {
            Op::RangeII => write!(f, "in [{lo}, {hi}]"),
            Op::RangeIE => write!(f, "in [{lo}, {hi})"),
            Op::RangeEI => write!(f, "in ({lo}, {hi}]"),
            Op::RangeEE => write!(f, "in ({lo}, {hi})"),
            op => write!(f, "{} {}", op.symbol(), self.values.join(", ")),
        }
    }
}

type PredicateFn = dyn Fn(&Value) -> Result<bool> + Send + Sync;

/// A highlight test on a cell's raw value.
#[derive(Clone)]
pub enum Predicate {
    Compare(Condition),
    /// Arbitrary test. Never called with null; null cells do not match.
    Custom(Arc<PredicateFn>),
}

impl Predicate {
    pub fn compare<I, S>(operator: ComparisonOperator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Compare(Condition::new(operator, values))
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<bool> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    pub const fn condition(&self) -> Option<&Condition> {
        match self {
            Self::Compare(c) => Some(c),
            Self::Custom(_) => None,
        }
    }

    /// Validate the predicate against the field it will be evaluated on and
    /// prepare it for evaluation. `field` is `None` for row criteria that are
    /// evaluated against whatever cell is being styled.
    ///
    /// # Errors
    /// `TypeMismatch` for ordered comparisons on text, vocabulary or boolean
    /// fields; `Configuration` for empty value lists, wrong bound counts and
    /// values that do not parse as the field's type.
    pub fn compile(&self, field: Option<&Field>) -> Result<CompiledPredicate> {
        let matcher = match self {
            Self::Custom(f) => Matcher::Custom(Arc::clone(f)),
            Self::Compare(c) => compile_condition(c, field)?,
        };
        Ok(CompiledPredicate {
            field: field.map(|f| f.name.clone()),
            matcher,
        })
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare(c) => f.debug_tuple("Compare").field(c).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare(c) => write!(f, "{c}"),
            Self::Custom(_) => f.write_str("matches custom test"),
        }
    }
}

#[derive(Clone)]
enum Matcher {
    IsNull,
    NotNull,
    Text {
        values: Vec<String>,
        substring: bool,
        negate: bool,
    },
    Bool {
        accept_true: bool,
        accept_false: bool,
        negate: bool,
    },
    Ordered {
        kind: OrderKind,
        operator: ComparisonOperator,
        bounds: Vec<Orderable>,
    },
    Custom(Arc<PredicateFn>),
}

/// A predicate checked against its field, ready for per-cell evaluation.
#[derive(Clone)]
pub struct CompiledPredicate {
    field: Option<String>,
    matcher: Matcher,
}

impl fmt::Debug for CompiledPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPredicate")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

impl CompiledPredicate {
    /// Test one raw cell value.
    ///
    /// # Errors
    /// `Evaluation` when the value cannot be read as the field's type or a
    /// custom test fails.
    pub fn matches(&self, value: Option<&Value>) -> Result<bool> {
        let Some(value) = value else {
            return Ok(matches!(self.matcher, Matcher::IsNull));
        };
        match &self.matcher {
            Matcher::IsNull => Ok(false),
            Matcher::NotNull => Ok(true),
            Matcher::Text {
                values,
                substring,
                negate,
            } => {
                let text = value.to_string().to_lowercase();
                let hit = if *substring {
                    values.iter().any(|v| text.contains(v.as_str()))
                } else {
                    values.iter().any(|v| *v == text)
                };
                Ok(hit != *negate)
            }
            Matcher::Bool {
                accept_true,
                accept_false,
                negate,
            } => {
                let b = match value.to_orderable(OrderKind::Bool) {
                    Some(Orderable::Bool(b)) => b,
                    _ => return Err(self.unreadable(value, "boolean")),
                };
                let hit = if b { *accept_true } else { *accept_false };
                Ok(hit != *negate)
            }
            Matcher::Ordered {
                kind,
                operator,
                bounds,
            } => {
                let v = value
                    .to_orderable(*kind)
                    .ok_or_else(|| self.unreadable(value, kind_name(*kind)))?;
                Ok(compare(&v, *operator, bounds))
            }
            Matcher::Custom(f) => f(value).map_err(|e| match e {
                StyleError::Evaluation { .. } => e,
                other => StyleError::evaluation(self.field_name(), other.to_string()),
            }),
        }
    }

    fn field_name(&self) -> &str {
        self.field.as_deref().unwrap_or("<unbound>")
    }

    fn unreadable(&self, value: &Value, expected: &str) -> StyleError {
        StyleError::evaluation(
            self.field_name(),
            format!("cannot read {} '{value}' as {expected}", value.type_name()),
        )
    }
}

const fn kind_name(kind: OrderKind) -> &'static str {
    match kind {
        OrderKind::Bool => "boolean",
        OrderKind::Int => "integer",
        OrderKind::Float => "number",
        OrderKind::Time => "timestamp",
        OrderKind::Text => "text",
    }
}

fn compare(v: &Orderable, operator: ComparisonOperator, bounds: &[Orderable]) -> bool {
    use ComparisonOperator as Op;
    match (operator, bounds) {
        (Op::Equal, list) => list.iter().any(|b| v == b),
        (Op::Different, list) => list.iter().all(|b| v != b),
        (Op::Greater, [b]) => v > b,
        (Op::GreaterOrEqual, [b]) => v >= b,
        (Op::Smaller, [b]) => v < b,
        (Op::SmallerOrEqual, [b]) => v <= b,
        (Op::RangeII, [lo, hi]) => v >= lo && v <= hi,
        (Op::RangeIE, [lo, hi]) => v >= lo && v < hi,
        (Op::RangeEI, [lo, hi]) => v > lo && v <= hi,
        (Op::RangeEE, [lo, hi]) => v > lo && v < hi,
        _ => false,
    }
}

fn compile_condition(c: &Condition, field: Option<&Field>) -> Result<Matcher> {
    use ComparisonOperator as Op;
    if c.null_value {
        return Ok(if c.operator == Op::Equal {
            Matcher::IsNull
        } else {
            Matcher::NotNull
        });
    }
    let field_label = field.map_or("<unbound>", |f| f.name.as_str());
    if c.values.is_empty() {
        return Err(StyleError::configuration(format!(
            "condition '{}' on '{field_label}' has no values",
            c.operator.symbol()
        )));
    }

    let substring = matches!(c.operator, Op::Contains | Op::DoesNotContain);
    let negate = matches!(c.operator, Op::Different | Op::DoesNotContain);
    let text_matcher = || Matcher::Text {
        values: c.values.iter().map(|v| v.trim().to_lowercase()).collect(),
        substring,
        negate,
    };

    let Some(field) = field else {
        if c.operator.is_ordered() {
            return Err(StyleError::configuration(format!(
                "'{}' comparison needs a bound field",
                c.operator.symbol()
            )));
        }
        return Ok(text_matcher());
    };

    if c.operator.is_ordered() && !field.field_type.is_ordered() {
        return Err(StyleError::type_mismatch(
            &field.name,
            "a numeric or timestamp field",
            format!("{} field for '{}'", field.field_type, c.operator.symbol()),
        ));
    }
    let expected = if c.operator.is_range() { 2 } else { 1 };
    if c.operator.is_ordered() && c.values.len() != expected {
        return Err(StyleError::configuration(format!(
            "'{}' on '{}' takes {expected} value(s), got {}",
            c.operator.symbol(),
            field.name,
            c.values.len()
        )));
    }

    if substring {
        return Ok(text_matcher());
    }
    match field.field_type {
        FieldType::Text | FieldType::Vocabulary => Ok(text_matcher()),
        FieldType::Boolean => {
            let mut accept_true = false;
            let mut accept_false = false;
            for v in &c.values {
                let v = v.trim();
                if v == "1" || v.eq_ignore_ascii_case("true") {
                    accept_true = true;
                } else if v == "0" || v.eq_ignore_ascii_case("false") {
                    accept_false = true;
                } else {
                    return Err(StyleError::configuration(format!(
                        "'{v}' is not a boolean value for '{}'",
                        field.name
                    )));
                }
            }
            Ok(Matcher::Bool {
                accept_true,
                accept_false,
                negate,
            })
        }
        FieldType::Integer | FieldType::Long | FieldType::Double | FieldType::Timestamp => {
            let kind = field.field_type.order_kind();
            let bounds = c
                .values
                .iter()
                .map(|text| {
                    Value::coerce(text, field.field_type)
                        .and_then(|v| v.to_orderable(kind))
                        .ok_or_else(|| {
                            StyleError::configuration(format!(
                                "'{text}' is not a valid {} for '{}'",
                                field.field_type, field.name
                            ))
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            if c.operator.is_range() {
                if let [lo, hi] = bounds.as_slice() {
                    if lo > hi {
                        return Err(StyleError::configuration(format!(
                            "range on '{}' has lower bound {lo} above upper bound {hi}",
                            field.name
                        )));
                    }
                }
            }
            Ok(Matcher::Ordered {
                kind,
                operator: c.operator,
                bounds,
            })
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

    fn depth() -> Field {
        Field::new("depth", FieldType::Integer)
    }

    #[test]
    fn test_greater_on_integer() {
        let p = Predicate::compare(ComparisonOperator::Greater, ["20"])
            .compile(Some(&depth()))
            .unwrap();
        assert!(p.matches(Some(&Value::Integer(21))).unwrap());
        assert!(!p.matches(Some(&Value::Integer(20))).unwrap());
        assert!(!p.matches(None).unwrap());
    }

    #[test]
    fn test_range_bounds() {
        let field = Field::new("af", FieldType::Double);
        let ie = Predicate::compare(ComparisonOperator::RangeIE, ["0.1", "0.5"])
            .compile(Some(&field))
            .unwrap();
        assert!(ie.matches(Some(&Value::Double(0.1))).unwrap());
        assert!(!ie.matches(Some(&Value::Double(0.5))).unwrap());
        let ee = Predicate::compare(ComparisonOperator::RangeEE, ["0.1", "0.5"])
            .compile(Some(&field))
            .unwrap();
        assert!(!ee.matches(Some(&Value::Double(0.1))).unwrap());
    }

    #[test]
    fn test_equal_is_case_insensitive_on_text() {
        let gene = Field::new("gene_symbol", FieldType::Text);
        let p = Predicate::compare(ComparisonOperator::Equal, ["brca1", "TP53"])
            .compile(Some(&gene))
            .unwrap();
        assert!(p.matches(Some(&Value::from("BRCA1"))).unwrap());
        assert!(!p.matches(Some(&Value::from("BRCA2"))).unwrap());
    }

    #[test]
    fn test_contains_and_negation() {
        let gene = Field::new("consequence", FieldType::Text);
        let p = Predicate::compare(ComparisonOperator::DoesNotContain, ["splice"])
            .compile(Some(&gene))
            .unwrap();
        assert!(p.matches(Some(&Value::from("missense_variant"))).unwrap());
        assert!(!p.matches(Some(&Value::from("SPLICE_region"))).unwrap());
    }

    #[test]
    fn test_null_flag() {
        let is_null = Predicate::Compare(Condition::is_null())
            .compile(Some(&depth()))
            .unwrap();
        assert!(is_null.matches(None).unwrap());
        assert!(!is_null.matches(Some(&Value::Integer(1))).unwrap());
        let not_null = Predicate::Compare(Condition::is_not_null())
            .compile(Some(&depth()))
            .unwrap();
        assert!(not_null.matches(Some(&Value::Integer(1))).unwrap());
    }

    #[test]
    fn test_boolean_values() {
        let field = Field::new("dbsnp", FieldType::Boolean);
        let p = Predicate::compare(ComparisonOperator::Equal, ["TRUE"])
            .compile(Some(&field))
            .unwrap();
        assert!(p.matches(Some(&Value::Boolean(true))).unwrap());
        assert!(!p.matches(Some(&Value::Boolean(false))).unwrap());
        assert!(p.matches(Some(&Value::from("1"))).unwrap());
    }

    #[test]
    fn test_ordered_on_text_is_type_mismatch() {
        let gene = Field::new("gene_symbol", FieldType::Text);
        let err = Predicate::compare(ComparisonOperator::Greater, ["A"])
            .compile(Some(&gene))
            .unwrap_err();
        assert!(matches!(err, StyleError::TypeMismatch { .. }));
    }

    #[test]
    fn test_configuration_errors() {
        let empty = Predicate::compare(ComparisonOperator::Equal, Vec::<String>::new());
        assert!(matches!(
            empty.compile(Some(&depth())).unwrap_err(),
            StyleError::Configuration { .. }
        ));
        let bad = Predicate::compare(ComparisonOperator::Smaller, ["ten"]);
        assert!(matches!(
            bad.compile(Some(&depth())).unwrap_err(),
            StyleError::Configuration { .. }
        ));
        let one_bound = Predicate::compare(ComparisonOperator::RangeII, ["1"]);
        assert!(one_bound.compile(Some(&depth())).is_err());
    }

    #[test]
    fn test_unreadable_value_is_evaluation_error() {
        let p = Predicate::compare(ComparisonOperator::Greater, ["20"])
            .compile(Some(&depth()))
            .unwrap();
        let err = p.matches(Some(&Value::from("n/a"))).unwrap_err();
        assert!(matches!(err, StyleError::Evaluation { .. }));
    }

    #[test]
    fn test_custom_predicate() {
        let p = Predicate::custom(|v| Ok(v.to_string().starts_with("rs")))
            .compile(None)
            .unwrap();
        assert!(p.matches(Some(&Value::from("rs123"))).unwrap());
        assert!(!p.matches(None).unwrap());
    }

    #[test]
    fn test_condition_display() {
        let c = Condition::new(ComparisonOperator::Greater, ["20"]);
        assert_eq!(c.to_string(), "> 20");
        let r = Condition::new(ComparisonOperator::RangeIE, ["1", "5"]);
        assert_eq!(r.to_string(), "in [1, 5)");
        assert_eq!(Condition::is_null().to_string(), "is null");
    }

    #[test]
    fn test_condition_serde() {
        let c = Condition::new(ComparisonOperator::RangeEI, ["1", "2"]);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"operator":"RANGE_EI","values":["1","2"]}"#);
        let back: Condition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
