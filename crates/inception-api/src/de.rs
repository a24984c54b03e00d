// Lenient field decoders.
//
// The controller is inconsistent about scalar encodings: ids arrive as
// GUID strings or bare integers, tick counts as numbers or numeric strings.

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

/// A string that may be sent as a JSON string or number.
pub(crate) fn flexible_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

/// Optional variant of [`flexible_string`]; `null` and `""` both become `None`.
pub(crate) fn flexible_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

/// A non-negative integer that may be sent as a number or numeric string.
pub(crate) fn flexible_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("expected non-negative integer, found {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected numeric string, found {s:?}"))),
        other => Err(D::Error::custom(format!(
            "expected integer or numeric string, found {other}"
        ))),
    }
}

/// Optional variant of [`flexible_u64`].
pub(crate) fn flexible_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => flexible_u64(value).map(Some).map_err(D::Error::custom),
    }
}
