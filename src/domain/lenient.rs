//! Lenient field readers used at the record read boundary.
//!
//! Stored and imported documents are loosely typed: numbers may arrive as
//! strings, optional fields may be `null`, missing, or garbage. These helpers
//! fold all of that into `Option`s so the domain conversion decides defaults
//! in one place.

use serde::{Deserialize, Deserializer};

use crate::domain::{Decimal, RecordId, TimeMs};

/// Numbers and numeric strings; anything else reads as `None`.
pub fn loose_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Decimal::from_json_loose))
}

/// Epoch milliseconds or parseable date text; anything else reads as `None`.
pub fn loose_time<'de, D>(deserializer: D) -> Result<Option<TimeMs>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(TimeMs::from_json_loose))
}

/// Strings (and numbers, rendered as text); blank strings read as `None`.
pub fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Booleans, plus the strings "true"/"false"; anything else reads as `None`.
pub fn loose_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(b)) => Some(b),
        Some(serde_json::Value::String(s)) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Required identifier given as a string or a number.
pub fn record_id<'de, D>(deserializer: D) -> Result<RecordId, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Ok(RecordId::new(s.trim())),
        serde_json::Value::Number(n) => Ok(RecordId::new(n.to_string())),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}
