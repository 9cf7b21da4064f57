//! Lenient field decoders for content API records.
//!
//! The content API hands back loosely-typed JSON: decimals arrive as strings,
//! relations arrive either as a bare id or as an expanded object, and any field
//! may be null. Every decoder here maps a value it cannot interpret to `None`
//! instead of failing the whole collection.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Integer foreign key: number, numeric string, or `{ "id": ... }`.
pub fn int_key<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(int_from_value(&value))
}

/// String foreign key (user ids): string, number, or `{ "id": ... }`.
pub fn string_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(string_from_value(&value))
}

/// Decimal amount: number or numeric string.
pub fn decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()))
}

/// Free text; numbers are stringified, anything else is dropped.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Timestamp in any of the shapes the content API emits, normalised to UTC.
pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(parse_timestamp))
}

/// Enum-like field parsed through `FromStr`; unknown values become `None`.
pub fn parsed<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(|s| s.trim().parse().ok()))
}

pub fn int_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => map.get("id").and_then(int_from_value),
        _ => None,
    }
}

pub fn string_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("id").and_then(string_from_value),
        _ => None,
    }
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS[.fff]`, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "int_key")]
        package: Option<i64>,
        #[serde(default, deserialize_with = "string_key")]
        teacher: Option<String>,
        #[serde(default, deserialize_with = "decimal")]
        rate: Option<f64>,
        #[serde(default, deserialize_with = "timestamp")]
        at: Option<NaiveDateTime>,
    }

    fn sample(value: serde_json::Value) -> Sample {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn foreign_keys_accept_ids_strings_and_objects() {
        assert_eq!(sample(json!({"package": 7})).package, Some(7));
        assert_eq!(sample(json!({"package": "7"})).package, Some(7));
        assert_eq!(sample(json!({"package": {"id": 7, "name": "x"}})).package, Some(7));
        assert_eq!(
            sample(json!({"teacher": {"id": "abc"}})).teacher.as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn malformed_foreign_keys_decode_to_none() {
        assert_eq!(sample(json!({"package": null})).package, None);
        assert_eq!(sample(json!({"package": true})).package, None);
        assert_eq!(sample(json!({"package": "seven"})).package, None);
        assert_eq!(sample(json!({"package": [1, 2]})).package, None);
        assert_eq!(sample(json!({})).package, None);
        assert_eq!(sample(json!({"teacher": ""})).teacher, None);
    }

    #[test]
    fn decimals_accept_strings() {
        assert_eq!(sample(json!({"rate": "100.50"})).rate, Some(100.5));
        assert_eq!(sample(json!({"rate": 42})).rate, Some(42.0));
        assert_eq!(sample(json!({"rate": "n/a"})).rate, None);
    }

    #[test]
    fn timestamps_in_all_supported_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-01-15"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T00:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 00:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T00:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T02:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(sample(json!({"at": 12})).at, None);
    }
}
