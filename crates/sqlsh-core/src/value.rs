//! Dynamic SQL values.

use crate::temporal::{format_date, format_timestamp};
use std::fmt;

/// A dynamically-typed SQL value as fetched from a result set.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,

    /// 32-bit signed integer
    Int(i32),

    /// 64-bit signed integer
    BigInt(i64),

    /// 64-bit floating point
    Double(f64),

    /// Text string
    Text(String),

    /// Binary payload
    Bytes(Vec<u8>),

    /// Date as days since 1970-01-01
    Date(i32),

    /// Timestamp as microseconds since 1970-01-01 00:00:00 UTC
    Timestamp(i64),
}

/// Default textual form. Timestamps use `YYYY-MM-DD HH:MM:SS` and dates
/// `YYYY-MM-DD`; byte payloads are decoded lossily as UTF-8.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Value::Date(d) => f.write_str(&format_date(*d)),
            Value::Timestamp(ts) => f.write_str(&format_timestamp(*ts)),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::days_from_civil;

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::BigInt(-7).to_string(), "-7");
        assert_eq!(Value::Double(1.5).to_string(), "1.5");
        assert_eq!(Value::Text("abc".into()).to_string(), "abc");
        assert_eq!(Value::Null.to_string(), "NULL");
    }

    #[test]
    fn test_display_bytes_decodes_as_text() {
        assert_eq!(Value::Bytes(b"hello".to_vec()).to_string(), "hello");
        assert_eq!(Value::Bytes(vec![0x66, 0xFF]).to_string(), "f\u{FFFD}");
    }

    #[test]
    fn test_display_temporal() {
        let days = days_from_civil(2024, 1, 2);
        assert_eq!(Value::Date(days as i32).to_string(), "2024-01-02");
        let micros = days * 86_400_000_000 + 3_600_000_000;
        assert_eq!(
            Value::Timestamp(micros).to_string(),
            "2024-01-02 01:00:00"
        );
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".into()));
        assert_eq!(Value::from(7_i64), Value::BigInt(7));
    }
}
