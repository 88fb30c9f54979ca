//! Lenient field decoders for provider payloads
//!
//! The provider is inconsistent about types: ids and timestamps arrive as
//! numbers or strings, text fields are sometimes `null`, and channel metadata
//! is usually a JSON document encoded inside a string.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Accept a string or any JSON number and keep it as text
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrNumberVisitor;

    impl<'de> Visitor<'de> for StringOrNumberVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(StringOrNumberVisitor)
}

/// Accept an integer or a string holding an integer
pub fn i64_from_string_or_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct I64Visitor;

    impl<'de> Visitor<'de> for I64Visitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer or a string representation of an integer")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            i64::try_from(value)
                .map_err(|_| E::custom(format!("u64 value {value} is out of range for i64")))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            value
                .trim()
                .parse::<i64>()
                .map_err(|_| E::custom(format!("invalid integer string: {value}")))
        }
    }

    deserializer.deserialize_any(I64Visitor)
}

/// Treat `null` (or a missing field, with `#[serde(default)]`) as an empty string
pub fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keep a JSON blob as its encoded text, whether it arrived encoded or inline
pub fn json_blob<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
        #[serde(deserialize_with = "i64_from_string_or_number")]
        ts: i64,
        #[serde(default, deserialize_with = "null_as_empty")]
        text: String,
        #[serde(default, deserialize_with = "json_blob")]
        blob: String,
    }

    #[test]
    fn test_numbers_and_strings() {
        let a: Sample = serde_json::from_str(r#"{"id": 42, "ts": "1700000000"}"#).unwrap();
        assert_eq!(a.id, "42");
        assert_eq!(a.ts, 1_700_000_000);
        assert_eq!(a.text, "");

        let b: Sample =
            serde_json::from_str(r#"{"id": "42", "ts": 1700000000, "text": null}"#).unwrap();
        assert_eq!(b.id, "42");
        assert_eq!(b.ts, 1_700_000_000);
        assert_eq!(b.text, "");
    }

    #[test]
    fn test_bad_timestamp_is_error() {
        let result: Result<Sample, _> = serde_json::from_str(r#"{"id": 1, "ts": "soon"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_blob_inline_or_encoded() {
        let encoded: Sample =
            serde_json::from_str(r#"{"id": 1, "ts": 1, "blob": "{\"a\":1}"}"#).unwrap();
        assert_eq!(encoded.blob, r#"{"a":1}"#);

        let inline: Sample = serde_json::from_str(r#"{"id": 1, "ts": 1, "blob": {"a":1}}"#).unwrap();
        assert_eq!(inline.blob, r#"{"a":1}"#);
    }
}
