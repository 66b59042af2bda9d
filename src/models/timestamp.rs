//! Timestamp scalar codec.
//!
//! Timestamps travel as integer epoch milliseconds. Inputs arrive either as
//! variable values (JSON) or as query literals; only integers are accepted.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A literal as it appears in a query document.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(String),
    Float(String),
    String(String),
    Boolean(bool),
    Enum(String),
    Null,
}

/// Domain timestamp to epoch milliseconds.
pub fn serialize(timestamp: &DateTime<Utc>) -> i64 {
    timestamp.timestamp_millis()
}

/// Variable input to a timestamp. Non-integer values yield `None`.
pub fn parse_value(value: &Value) -> Option<DateTime<Utc>> {
    value.as_i64().and_then(DateTime::from_timestamp_millis)
}

/// Literal input to a timestamp. Only integer literals are accepted.
pub fn parse_literal(literal: &Literal) -> Option<DateTime<Utc>> {
    match literal {
        Literal::Int(raw) => raw
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// serde adapter for `DateTime<Utc>` fields exposed through the scalar.
pub mod millis {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(super::serialize(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let millis = i64::deserialize(deserializer)?;
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {}", millis)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        for millis in [0i64, 1, -1, 1_704_067_200_000, 253_402_300_799_999, -62_135_596_800_000] {
            let parsed = parse_value(&json!(millis)).unwrap();
            assert_eq!(serialize(&parsed), millis);
        }
    }

    #[test]
    fn test_parse_value_rejects_non_integers() {
        assert!(parse_value(&json!(1.5)).is_none());
        assert!(parse_value(&json!("1704067200000")).is_none());
        assert!(parse_value(&json!(true)).is_none());
        assert!(parse_value(&Value::Null).is_none());
    }

    #[test]
    fn test_parse_literal_accepts_only_ints() {
        let parsed = parse_literal(&Literal::Int("1704067200000".to_string())).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T00:00:00+00:00");

        assert!(parse_literal(&Literal::Float("1.0".to_string())).is_none());
        assert!(parse_literal(&Literal::String("1704067200000".to_string())).is_none());
        assert!(parse_literal(&Literal::Boolean(true)).is_none());
        assert!(parse_literal(&Literal::Enum("NOW".to_string())).is_none());
        assert!(parse_literal(&Literal::Null).is_none());
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        assert!(parse_value(&json!(i64::MAX)).is_none());
        assert!(parse_literal(&Literal::Int("99999999999999999999".to_string())).is_none());
    }
}
