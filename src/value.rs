// Typed cell values shared by datasets, filters and chart labels

use chrono::{NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// A single spreadsheet cell.
///
/// A `Float` holding NaN is treated as missing everywhere, the same as `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    Text(String),
}

/// Hashable identity of a non-null cell, used for grouping and distinct values.
///
/// Integers and floats share one numeric key so `1` and `1.0` land in the same group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKey {
    Bool(bool),
    Number(u64),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// True for null cells and empty strings.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Text(s) => s.is_empty(),
            other => other.is_null(),
        }
    }

    /// True for cells that can sit on a chart axis: not null, not infinite.
    pub fn is_plottable(&self) -> bool {
        match self {
            CellValue::Float(f) => f.is_finite(),
            other => !other.is_null(),
        }
    }

    /// Numeric view of the cell.
    ///
    /// Booleans count as 0/1, timestamps as milliseconds since the Unix epoch,
    /// and text only when it parses as a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) if f.is_nan() => None,
            CellValue::Float(f) => Some(*f),
            CellValue::Timestamp(ts) => Some(ts.and_utc().timestamp_millis() as f64),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    pub fn key(&self) -> Option<CellKey> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(b) => Some(CellKey::Bool(*b)),
            CellValue::Integer(i) => Some(numeric_key(*i as f64)),
            CellValue::Float(f) if f.is_nan() => None,
            CellValue::Float(f) => Some(numeric_key(*f)),
            CellValue::Timestamp(ts) => Some(CellKey::Timestamp(*ts)),
            CellValue::Text(s) => Some(CellKey::Text(s.clone())),
        }
    }

    /// Equality used by row filters and category matching.
    ///
    /// Null never matches anything. Integers and floats compare numerically;
    /// every other pairing requires the same type.
    pub fn matches(&self, other: &CellValue) -> bool {
        match (self.key(), other.key()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Ascending order for sorted category labels.
    ///
    /// Numbers sort numerically and text lexicographically. Mixed columns
    /// order by type: booleans, numbers, timestamps, text, then nulls.
    pub fn natural_cmp(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Timestamp(a), CellValue::Timestamp(b)) => a.cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (a, b) if a.type_rank() == 1 && b.type_rank() == 1 => {
                let fa = a.as_f64().unwrap_or(f64::NAN);
                let fb = b.as_f64().unwrap_or(f64::NAN);
                fa.total_cmp(&fb)
            }
            (a, b) => a.type_rank().cmp(&b.type_rank()),
        }
    }

    fn type_rank(&self) -> u8 {
        if self.is_null() {
            return 4;
        }
        match self {
            CellValue::Bool(_) => 0,
            CellValue::Integer(_) | CellValue::Float(_) => 1,
            CellValue::Timestamp(_) => 2,
            CellValue::Text(_) => 3,
            CellValue::Null => 4,
        }
    }

    /// Convert a JSON scalar. Arrays and objects have no cell representation.
    pub fn from_json(value: &Value) -> Option<CellValue> {
        match value {
            Value::Null => Some(CellValue::Null),
            Value::Bool(b) => Some(CellValue::Bool(*b)),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => CellValue::Integer(i),
                None => CellValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            Value::String(s) => Some(CellValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Integer(i) => Value::from(*i),
            CellValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellValue::Timestamp(ts) => Value::String(iso_format(ts)),
            CellValue::Text(s) => Value::String(s.clone()),
        }
    }
}

fn numeric_key(v: f64) -> CellKey {
    // -0.0 and 0.0 must share a group
    let v = if v == 0.0 { 0.0 } else { v };
    CellKey::Number(v.to_bits())
}

/// ISO-8601 rendering, with microseconds only when present.
pub fn iso_format(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Timestamp(ts) => f.write_str(&iso_format(ts)),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_unit(),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Integer(i) => serializer.serialize_i64(*i),
            CellValue::Float(v) if !v.is_finite() => serializer.serialize_unit(),
            CellValue::Float(v) => serializer.serialize_f64(*v),
            CellValue::Timestamp(ts) => serializer.serialize_str(&iso_format(ts)),
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_nan_is_null() {
        assert!(CellValue::Float(f64::NAN).is_null());
        assert!(CellValue::Null.is_null());
        assert!(!CellValue::Float(0.0).is_null());
        assert_eq!(CellValue::Float(f64::NAN).key(), None);
    }

    #[test]
    fn test_plottable_cells() {
        assert!(CellValue::text("Jan").is_plottable());
        assert!(CellValue::Integer(0).is_plottable());
        assert!(!CellValue::Float(f64::INFINITY).is_plottable());
        assert!(!CellValue::Float(f64::NAN).is_plottable());
        assert!(!CellValue::Null.is_plottable());
    }

    #[test]
    fn test_numeric_matching_across_int_and_float() {
        assert!(CellValue::Integer(3).matches(&CellValue::Float(3.0)));
        assert!(CellValue::Float(-0.0).matches(&CellValue::Integer(0)));
        assert!(!CellValue::Integer(3).matches(&CellValue::text("3")));
        assert!(!CellValue::Bool(true).matches(&CellValue::Integer(1)));
        assert!(!CellValue::Null.matches(&CellValue::Null));
    }

    #[test]
    fn test_natural_order() {
        let mut values = vec![
            CellValue::Integer(10),
            CellValue::Float(2.5),
            CellValue::Integer(-1),
        ];
        values.sort_by(|a, b| a.natural_cmp(b));
        assert_eq!(
            values,
            vec![CellValue::Integer(-1), CellValue::Float(2.5), CellValue::Integer(10)]
        );

        let mut words = vec![CellValue::text("b"), CellValue::text("B"), CellValue::text("a")];
        words.sort_by(|a, b| a.natural_cmp(b));
        assert_eq!(words, vec![CellValue::text("B"), CellValue::text("a"), CellValue::text("b")]);
    }

    #[test]
    fn test_mixed_types_order_by_rank() {
        assert_eq!(
            CellValue::Integer(100).natural_cmp(&CellValue::text("0")),
            Ordering::Less
        );
        assert_eq!(
            CellValue::Bool(true).natural_cmp(&CellValue::Integer(-5)),
            Ordering::Less
        );
    }

    #[test]
    fn test_json_round_trip_of_scalars() {
        let v = serde_json::json!(5);
        assert_eq!(CellValue::from_json(&v), Some(CellValue::Integer(5)));
        let v = serde_json::json!(2.5);
        assert_eq!(CellValue::from_json(&v), Some(CellValue::Float(2.5)));
        assert_eq!(CellValue::from_json(&serde_json::json!([1])), None);
        assert_eq!(CellValue::Float(f64::INFINITY).to_json(), Value::Null);
    }

    #[test]
    fn test_timestamp_serializes_iso() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let json = serde_json::to_string(&CellValue::Timestamp(ts)).unwrap();
        assert_eq!(json, "\"2024-01-05T08:30:00\"");
    }

    #[test]
    fn test_as_f64_views() {
        assert_eq!(CellValue::text(" 4.5 ").as_f64(), Some(4.5));
        assert_eq!(CellValue::text("north").as_f64(), None);
        assert_eq!(CellValue::Bool(true).as_f64(), Some(1.0));
    }
}
