//! Cell values and the comparison table used by filters
//!
//! A cell holds one of five semantic types or `Null`. Comparisons between a
//! cell and a literal are three-valued: they either produce an ordering, an
//! equality answer, or nothing at all ([`Comparison::Incomparable`]). Null on
//! either side is always incomparable, so a missing value never matches a
//! condition.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A single table cell
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    Text(String),
    /// ISO-8601 date or timestamp, kept as received
    Date(String),
    List(Vec<String>),
}

/// Observed type of a value or column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Date,
    List,
    /// Column without any non-null values
    Unknown,
    /// Column whose non-null values disagree on type
    Mixed,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
            ValueType::List => "list",
            ValueType::Unknown => "unknown",
            ValueType::Mixed => "mixed",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing a cell against a literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Both sides live on a total order (numbers, dates)
    Ordered(Ordering),
    /// Both sides only support equality (text, booleans, lists)
    Equality(bool),
    /// Null on either side, or mismatched types
    Incomparable,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type of a non-null value; `None` for `Null`.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(ValueType::Boolean),
            Value::Number(_) => Some(ValueType::Number),
            Value::Text(_) => Some(ValueType::String),
            Value::Date(_) => Some(ValueType::Date),
            Value::List(_) => Some(ValueType::List),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Date(s) => Some(s),
            _ => None,
        }
    }

    /// Compare this cell (left) against `other` (right).
    pub fn compare(&self, other: &Value) -> Comparison {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => Comparison::Incomparable,
            (Value::Number(a), Value::Number(b)) => a
                .partial_cmp(b)
                .map_or(Comparison::Incomparable, Comparison::Ordered),
            (Value::Date(a), Value::Date(b)) => match (parse_instant(a), parse_instant(b)) {
                (Some(a), Some(b)) => Comparison::Ordered(a.cmp(&b)),
                _ => Comparison::Incomparable,
            },
            // Text that does not read as a date is still text
            (Value::Date(a), Value::Text(b)) | (Value::Text(a), Value::Date(b)) => {
                match (parse_instant(a), parse_instant(b)) {
                    (Some(a), Some(b)) => Comparison::Ordered(a.cmp(&b)),
                    _ => Comparison::Equality(a == b),
                }
            }
            (Value::Text(a), Value::Text(b)) => Comparison::Equality(a == b),
            (Value::Boolean(a), Value::Boolean(b)) => Comparison::Equality(a == b),
            (Value::List(a), Value::List(b)) => Comparison::Equality(a == b),
            _ => Comparison::Incomparable,
        }
    }
}

/// Parse `YYYY-MM-DD`, RFC 3339, or a zone-less `YYYY-MM-DDTHH:MM:SS[.f]`.
/// Zone-less values are read as UTC.
pub fn parse_instant(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().fixed_offset());
    }
    if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(day.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset());
    }
    None
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) | Value::Date(s) => f.write_str(s),
            Value::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// JSON literals as they arrive in condition sets. Strings that read as
/// dates become [`Value::Date`] so they compare chronologically.
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => {
                if parse_instant(&s).is_some() {
                    Value::Date(s)
                } else {
                    Value::Text(s)
                }
            }
            serde_json::Value::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            object @ serde_json::Value::Object(_) => Value::Text(object.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_is_incomparable() {
        assert_eq!(Value::Null.compare(&Value::from(1)), Comparison::Incomparable);
        assert_eq!(Value::from(1).compare(&Value::Null), Comparison::Incomparable);
        assert_eq!(Value::Null.compare(&Value::Null), Comparison::Incomparable);
    }

    #[test]
    fn test_numbers_are_ordered() {
        assert_eq!(
            Value::from(2022).compare(&Value::from(2023)),
            Comparison::Ordered(Ordering::Less)
        );
        assert_eq!(
            Value::from(f64::NAN).compare(&Value::from(1.0)),
            Comparison::Incomparable
        );
    }

    #[test]
    fn test_dates_compare_chronologically() {
        let day = Value::Date("2023-05-01".to_string());
        let stamp = Value::Date("2023-04-30T23:00:00.000+00:00".to_string());
        assert_eq!(day.compare(&stamp), Comparison::Ordered(Ordering::Greater));

        let offset = Value::Date("2023-05-01T02:00:00+02:00".to_string());
        assert_eq!(day.compare(&offset), Comparison::Ordered(Ordering::Equal));
    }

    #[test]
    fn test_text_supports_equality_only() {
        assert_eq!(
            Value::from("cats").compare(&Value::from("dogs")),
            Comparison::Equality(false)
        );
        assert_eq!(
            Value::from("cats").compare(&Value::from(3)),
            Comparison::Incomparable
        );
    }

    #[test]
    fn test_date_literal_against_plain_text() {
        let literal = Value::Date("2023-01-15".to_string());
        assert_eq!(
            Value::from("rent").compare(&literal),
            Comparison::Equality(false)
        );
        assert_eq!(
            Value::from("2023-01-15").compare(&literal),
            Comparison::Ordered(Ordering::Equal)
        );
        assert_eq!(
            literal.compare(&Value::from("not a date")),
            Comparison::Equality(false)
        );
    }

    #[test]
    fn test_from_json_literal() {
        assert_eq!(Value::from(json!(2023)), Value::Number(2023.0));
        assert_eq!(Value::from(json!("Food")), Value::Text("Food".into()));
        assert_eq!(
            Value::from(json!("2023-01-15")),
            Value::Date("2023-01-15".into())
        );
        assert_eq!(
            Value::from(json!(["a", "b"])),
            Value::List(vec!["a".into(), "b".into()])
        );
        assert_eq!(Value::from(json!(null)), Value::Null);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(15.0).to_string(), "15");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(
            Value::List(vec!["a".into(), "b".into()]).to_string(),
            "[a, b]"
        );
    }

    #[test]
    fn test_serialize_untagged() {
        let encoded = serde_json::to_value(vec![
            Value::Null,
            Value::from(true),
            Value::from(1.5),
            Value::from("x"),
        ])
        .unwrap();
        assert_eq!(encoded, json!([null, true, 1.5, "x"]));
    }
}
