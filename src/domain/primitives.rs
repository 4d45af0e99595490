//! Domain primitives: TimeMs, RecordId, Symbol, Direction, SpotSide, Leverage.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::domain::Decimal;

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

/// Naive layouts accepted besides RFC 3339, interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        TimeMs(Utc::now().timestamp_millis())
    }

    /// Get the underlying milliseconds value.
    pub fn as_ms(&self) -> i64 {
        self.0
    }

    /// Parse a timestamp from free-form text.
    ///
    /// Accepts integer milliseconds, RFC 3339, `YYYY-MM-DDTHH:MM[:SS]`
    /// and bare `YYYY-MM-DD` dates. Returns `None` for anything else.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Ok(ms) = input.parse::<i64>() {
            return Some(TimeMs(ms));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Some(TimeMs(dt.timestamp_millis()));
        }

        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
                return Some(TimeMs(dt.and_utc().timestamp_millis()));
            }
        }

        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| TimeMs(dt.and_utc().timestamp_millis()))
    }

    /// Read a timestamp out of a loosely typed JSON value.
    pub fn from_json_loose(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(TimeMs),
            serde_json::Value::String(s) => Self::parse(s),
            _ => None,
        }
    }

    /// Format as RFC 3339 (UTC), or an empty string when out of range.
    pub fn to_rfc3339(&self) -> String {
        DateTime::<Utc>::from_timestamp_millis(self.0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default()
    }
}

/// Opaque record identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Create a RecordId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    /// Assign a fresh random identifier.
    pub fn generate() -> Self {
        RecordId(uuid::Uuid::new_v4().to_string())
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asset or contract ticker (e.g., "BTC", "ETHUSDT"), stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a Symbol, trimming whitespace and upper-casing.
    pub fn new(symbol: &str) -> Self {
        Symbol(symbol.trim().to_uppercase())
    }

    /// Get the symbol as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a leveraged position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Profits when price rises.
    Long,
    /// Profits when price falls.
    Short,
}

impl Direction {
    /// Parse "long"/"short" case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "long" => Some(Direction::Long),
            "short" => Some(Direction::Short),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }

    /// Gross P&L of moving `quantity` from `entry` to `exit` in this direction.
    ///
    /// `None` when the result does not fit in a decimal.
    pub fn gross_pnl(&self, entry: Decimal, exit: Decimal, quantity: Decimal) -> Option<Decimal> {
        let move_per_unit = match self {
            Direction::Long => exit.checked_sub(entry)?,
            Direction::Short => entry.checked_sub(exit)?,
        };
        move_per_unit.checked_mul(quantity)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spot execution side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotSide {
    Buy,
    Sell,
}

impl SpotSide {
    /// Parse "buy"/"sell" case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "buy" => Some(SpotSide::Buy),
            "sell" => Some(SpotSide::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpotSide::Buy => "buy",
            SpotSide::Sell => "sell",
        }
    }
}

impl std::fmt::Display for SpotSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leverage multiplier, always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leverage(NonZeroU32);

impl Leverage {
    /// Returns `None` for zero.
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Leverage)
    }

    /// Accepts only positive integral decimals.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        value.to_u32_exact().and_then(Self::new)
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }

    pub fn as_decimal(&self) -> Decimal {
        Decimal::from(self.get())
    }
}
