//! Lenient field decoders for upstream JSON.
//!
//! The upstream services are not consistent about scalar types: versions
//! arrive as numbers or numeric strings, flags as booleans or 0/1.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Boolean from `true`/`false`, a number (non-zero is true) or a string.
/// `null` and missing fields are false.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => false,
        Some(Scalar::Bool(b)) => b,
        Some(Scalar::Int(n)) => n != 0,
        Some(Scalar::Float(f)) => f != 0.0,
        Some(Scalar::Text(s)) => matches!(s.trim(), "1" | "true" | "True" | "TRUE"),
    })
}

/// Optional unsigned integer from a number or a numeric string.
pub fn opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(n)) => u32::try_from(n)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("version out of range: {}", n))),
        Some(Scalar::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("not a version number: {}", s))),
        Some(_) => Err(D::Error::custom("expected an integer version")),
    }
}

/// Optional string from a string or a number (ids are sometimes numeric).
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => None,
        Some(Scalar::Text(s)) => Some(s),
        Some(Scalar::Int(n)) => Some(n.to_string()),
        Some(Scalar::Float(f)) => Some(f.to_string()),
        Some(Scalar::Bool(b)) => Some(b.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "flag")]
        canonical: bool,
        #[serde(default, deserialize_with = "opt_u32")]
        version: Option<u32>,
        #[serde(default, deserialize_with = "opt_string")]
        id: Option<String>,
    }

    #[test]
    fn test_flag_forms() {
        for (json, expected) in [
            (r#"{"canonical": 1}"#, true),
            (r#"{"canonical": true}"#, true),
            (r#"{"canonical": 0}"#, false),
            (r#"{"canonical": null}"#, false),
            (r#"{}"#, false),
        ] {
            let probe: Probe = serde_json::from_str(json).unwrap();
            assert_eq!(probe.canonical, expected, "{}", json);
        }
    }

    #[test]
    fn test_version_forms() {
        let probe: Probe = serde_json::from_str(r#"{"version": "5"}"#).unwrap();
        assert_eq!(probe.version, Some(5));
        let probe: Probe = serde_json::from_str(r#"{"version": 12}"#).unwrap();
        assert_eq!(probe.version, Some(12));
        assert!(serde_json::from_str::<Probe>(r#"{"version": "v1"}"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{"version": -1}"#).is_err());
    }

    #[test]
    fn test_numeric_id() {
        let probe: Probe = serde_json::from_str(r#"{"id": 672}"#).unwrap();
        assert_eq!(probe.id.as_deref(), Some("672"));
    }
}
