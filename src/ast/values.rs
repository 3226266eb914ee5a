use crate::ast::types::{DataType, IntervalUnit, TypeKind};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// A literal value carried by `Literal` nodes and bound parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Decimal(Decimal),
    String(String),
    Binary(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Uuid(Uuid),
    /// Interval amount; the unit lives on the literal's `Interval` type.
    Interval(i64),
    Array(Vec<Value>),
    Json(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The type a literal gets when the caller does not give one.
    pub fn infer_type(&self) -> DataType {
        match self {
            Value::Null => DataType::null(),
            Value::Bool(_) => DataType::boolean().not_null(),
            Value::Int(_) => DataType::int64().not_null(),
            Value::UInt(_) => DataType::new(TypeKind::UInt64).not_null(),
            Value::Float(_) => DataType::float64().not_null(),
            Value::Decimal(d) => DataType::new(TypeKind::Decimal {
                precision: None,
                scale: Some(d.scale() as u8),
            })
            .not_null(),
            Value::String(_) => DataType::string().not_null(),
            Value::Binary(_) => DataType::binary().not_null(),
            Value::Date(_) => DataType::date().not_null(),
            Value::Time(_) => DataType::time().not_null(),
            Value::Timestamp(_) => DataType::timestamp().not_null(),
            Value::Uuid(_) => DataType::uuid().not_null(),
            Value::Interval(_) => DataType::interval(IntervalUnit::Second).not_null(),
            Value::Array(items) => {
                let elem = items
                    .iter()
                    .find(|v| !v.is_null())
                    .map(Value::infer_type)
                    .unwrap_or_else(DataType::null);
                DataType::array(elem).not_null()
            }
            Value::Json(_) => DataType::json().not_null(),
        }
    }

    /// Whether this value can be a literal of `ty`.
    pub fn fits(&self, ty: &DataType) -> bool {
        match self {
            Value::Null => ty.nullable || ty.is_null(),
            Value::Bool(_) => ty.is_boolean(),
            Value::Int(_) => ty.is_numeric(),
            Value::UInt(_) => ty.is_numeric(),
            Value::Float(_) => ty.is_floating() || ty.is_decimal(),
            Value::Decimal(_) => ty.is_decimal() || ty.is_floating(),
            Value::String(_) => ty.is_string() || ty.is_json(),
            Value::Binary(_) => ty.is_binary(),
            Value::Date(_) => ty.is_date(),
            Value::Time(_) => ty.is_time(),
            Value::Timestamp(_) => ty.is_timestamp(),
            Value::Uuid(_) => ty.is_uuid(),
            Value::Interval(_) => ty.is_interval(),
            Value::Array(items) => match ty.element() {
                Some(elem) => items.iter().all(|v| v.fits(elem)),
                None => false,
            },
            Value::Json(_) => ty.is_json(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            // Bitwise so that literals hash-cons consistently (NaN == NaN).
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Decimal(a), Value::Decimal(b)) => a == b && a.scale() == b.scale(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::Interval(a), Value::Interval(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(n) => n.hash(state),
            Value::UInt(n) => n.hash(state),
            Value::Float(x) => x.to_bits().hash(state),
            Value::Decimal(d) => {
                d.hash(state);
                d.scale().hash(state);
            }
            Value::String(s) | Value::Json(s) => s.hash(state),
            Value::Binary(b) => b.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Time(t) => t.hash(state),
            Value::Timestamp(ts) => ts.hash(state),
            Value::Uuid(u) => u.hash(state),
            Value::Interval(n) => n.hash(state),
            Value::Array(items) => items.hash(state),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::UInt(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::String(s) | Value::Json(s) => write!(f, "'{}'", s),
            Value::Binary(b) => {
                write!(f, "x'")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, "'")
            }
            Value::Date(d) => write!(f, "{}", d),
            Value::Time(t) => write!(f, "{}", t),
            Value::Timestamp(ts) => write!(f, "{}", ts),
            Value::Uuid(u) => write!(f, "{}", u),
            Value::Interval(n) => write!(f, "interval {}", n),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
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

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(ts: NaiveDateTime) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_identity_is_bitwise() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
    }

    #[test]
    fn test_fits() {
        assert!(Value::Int(3).fits(&DataType::float64()));
        assert!(!Value::String("x".into()).fits(&DataType::int64()));
        assert!(Value::Null.fits(&DataType::binary()));
        assert!(!Value::Null.fits(&DataType::binary().not_null()));
        assert!(
            Value::Array(vec![Value::Int(1), Value::Null]).fits(&DataType::array(DataType::int64()))
        );
    }
}
