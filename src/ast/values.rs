use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{QueryError, QueryResult};

/// A constant value, either lifted into a query or bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean, rendered as 0/1
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float, always rendered with a fractional part; NaN and infinities
    /// have no SQL literal and render as NULL
    Float(f64),
    /// String
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time without zone
    DateTime(NaiveDateTime),
    /// Time of day
    Time(NaiveTime),
    /// UUID value
    Uuid(Uuid),
    /// Sequence of values, rendered parenthesized
    List(Vec<Value>),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", u8::from(*b)),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) if n.is_finite() => write!(f, "{:?}", n),
            Value::Float(_) => write!(f, "NULL"),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Date(d) => write!(f, "'{}'", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "'{}'", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Time(t) => write!(f, "'{}'", t.format("%H:%M:%S")),
            Value::Uuid(u) => write!(f, "'{}'", u),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::Time(t)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = QueryError;

    fn try_from(json: serde_json::Value) -> QueryResult<Self> {
        match json {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::Int(i)),
                None => n
                    .as_f64()
                    .map(Value::Float)
                    .ok_or_else(|| QueryError::InvalidBinding(format!("number out of range: {}", n))),
            },
            serde_json::Value::String(s) => Ok(Value::Text(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Value::try_from)
                .collect::<QueryResult<Vec<_>>>()
                .map(Value::List),
            serde_json::Value::Object(_) => Err(QueryError::InvalidBinding(
                "objects cannot be bound as parameter values".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_constants() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::from(true).to_string(), "1");
        assert_eq!(Value::from(false).to_string(), "0");
        assert_eq!(Value::from("it's").to_string(), "'it''s'");
        assert_eq!(Value::from(vec!["3", "4"]).to_string(), "('3', '4')");
        assert_eq!(Value::from(Option::<i64>::None).to_string(), "NULL");
    }

    #[test]
    fn test_render_floats() {
        assert_eq!(Value::from(1.0).to_string(), "1.0");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(-0.125).to_string(), "-0.125");
        assert_eq!(Value::from(f64::NAN).to_string(), "NULL");
        assert_eq!(Value::from(f64::INFINITY).to_string(), "NULL");
        assert_eq!(Value::from(f64::NEG_INFINITY).to_string(), "NULL");
    }

    #[test]
    fn test_render_temporal() {
        let d = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        assert_eq!(Value::from(d).to_string(), "'2001-01-01'");
        let dt = d.and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(Value::from(dt).to_string(), "'2001-01-01 09:30:00'");
        let t = NaiveTime::from_hms_opt(23, 5, 1).unwrap();
        assert_eq!(Value::from(t).to_string(), "'23:05:01'");
    }

    #[test]
    fn test_from_json() {
        let json: serde_json::Value = serde_json::json!([1, 2.5, "a", null, true]);
        let value = Value::try_from(json).unwrap();
        assert_eq!(
            value,
            Value::List(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::Text("a".into()),
                Value::Null,
                Value::Bool(true),
            ])
        );

        let err = Value::try_from(serde_json::json!({"a": 1})).unwrap_err();
        assert!(matches!(err, QueryError::InvalidBinding(_)));
    }
}
