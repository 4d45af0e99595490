//! Leveraged (futures) trade with an explicit open/closed lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::key::content_key;
use crate::domain::lenient::{loose_decimal, loose_string, loose_time};
use crate::domain::record_error::{bounded_notional, non_negative, RecordError};
use crate::domain::{Decimal, Direction, Leverage, RecordId, Symbol, TimeMs};

/// Exit leg of a closed position. The pnl is frozen at close time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    pub date: TimeMs,
    pub price: Decimal,
    pub fees: Decimal,
    /// Net realized pnl (direction-aware, entry and exit fees deducted).
    pub pnl: Decimal,
}

/// Position lifecycle: `Open -> Closed`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    Open,
    Closed(Exit),
}

impl PositionStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, PositionStatus::Open)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, PositionStatus::Closed(_))
    }

    pub fn exit(&self) -> Option<&Exit> {
        match self {
            PositionStatus::Open => None,
            PositionStatus::Closed(exit) => Some(exit),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PositionStatus::Open => "open",
            PositionStatus::Closed(_) => "closed",
        }
    }
}

/// A leveraged position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FuturesTradeRecord", into = "FuturesTradeRecord")]
pub struct FuturesTrade {
    pub id: RecordId,
    pub symbol: Symbol,
    pub direction: Direction,
    pub leverage: Leverage,
    pub entry_date: TimeMs,
    pub entry_price: Decimal,
    pub quantity: Decimal,
    pub entry_fees: Decimal,
    pub notes: String,
    pub status: PositionStatus,
}

/// Net pnl of a round trip: gross move minus both fee legs.
///
/// `None` when any step overflows.
pub fn net_pnl(
    direction: Direction,
    entry_price: Decimal,
    exit_price: Decimal,
    quantity: Decimal,
    entry_fees: Decimal,
    exit_fees: Decimal,
) -> Option<Decimal> {
    direction
        .gross_pnl(entry_price, exit_price, quantity)?
        .checked_sub(entry_fees)?
        .checked_sub(exit_fees)
}

impl FuturesTrade {
    /// Open a new position from a creation request.
    ///
    /// `opened_at` is used when the request carries no entry date.
    pub fn open(
        request: NewFuturesTrade,
        id: RecordId,
        opened_at: TimeMs,
    ) -> Result<Self, RecordError> {
        let symbol = Symbol::new(&request.symbol);
        if symbol.is_empty() {
            return Err(RecordError::MissingField("symbol"));
        }
        let leverage = Leverage::new(request.leverage)
            .ok_or_else(|| RecordError::invalid("leverage", "must be at least 1"))?;
        let entry_price = non_negative("entryPrice", request.entry_price)?;
        let quantity = non_negative("quantity", request.quantity)?;
        bounded_notional("entryPrice", entry_price, quantity)?;

        Ok(FuturesTrade {
            id,
            symbol,
            direction: request.direction,
            leverage,
            entry_date: request.entry_date.unwrap_or(opened_at),
            entry_price,
            quantity,
            entry_fees: non_negative("entryFees", request.entry_fees.unwrap_or_default())?,
            notes: request.notes.unwrap_or_default(),
            status: PositionStatus::Open,
        })
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }

    pub fn exit(&self) -> Option<&Exit> {
        self.status.exit()
    }

    /// Frozen pnl for closed trades, zero while open.
    pub fn realized_pnl(&self) -> Decimal {
        self.exit().map(|e| e.pnl).unwrap_or_default()
    }

    /// Entry fees plus exit fees when closed.
    pub fn total_fees(&self) -> Decimal {
        self.entry_fees + self.exit().map(|e| e.fees).unwrap_or_default()
    }
}

/// Request body for opening a position.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFuturesTrade {
    pub symbol: String,
    pub direction: Direction,
    pub leverage: u32,
    #[serde(default)]
    pub entry_date: Option<TimeMs>,
    pub entry_price: Decimal,
    pub quantity: Decimal,
    #[serde(default)]
    pub entry_fees: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Flat, loosely typed document shape of a futures trade.
///
/// This is what gets persisted and exchanged; unknown fields are ignored and
/// every numeric field tolerates strings, nulls and garbage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesTradeRecord {
    #[serde(default, deserialize_with = "loose_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub direction: Option<String>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub leverage: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_time")]
    pub entry_date: Option<TimeMs>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub entry_price: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub quantity: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub entry_fees: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "loose_time")]
    pub exit_date: Option<TimeMs>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub exit_price: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub exit_fees: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub pnl: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_string")]
    pub notes: Option<String>,
}

impl FuturesTradeRecord {
    /// True when the status field says "closed" (case-insensitive).
    pub fn is_closed(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| s.trim().eq_ignore_ascii_case("closed"))
            .unwrap_or(false)
    }
}

impl From<FuturesTrade> for FuturesTradeRecord {
    fn from(trade: FuturesTrade) -> Self {
        let exit = trade.exit().copied();
        FuturesTradeRecord {
            id: Some(trade.id.0),
            symbol: Some(trade.symbol.to_string()),
            direction: Some(trade.direction.to_string()),
            leverage: Some(trade.leverage.as_decimal()),
            entry_date: Some(trade.entry_date),
            entry_price: Some(trade.entry_price),
            quantity: Some(trade.quantity),
            entry_fees: Some(trade.entry_fees),
            status: Some(trade.status.label().to_string()),
            exit_date: exit.map(|e| e.date),
            exit_price: exit.map(|e| e.price),
            exit_fees: exit.map(|e| e.fees),
            pnl: Some(exit.map(|e| e.pnl).unwrap_or_default()),
            notes: Some(trade.notes),
        }
    }
}

impl TryFrom<FuturesTradeRecord> for FuturesTrade {
    type Error = RecordError;

    fn try_from(record: FuturesTradeRecord) -> Result<Self, Self::Error> {
        let symbol = record
            .symbol
            .as_deref()
            .map(Symbol::new)
            .filter(|s| !s.is_empty())
            .ok_or(RecordError::MissingField("symbol"))?;

        let direction_raw = record
            .direction
            .as_deref()
            .ok_or(RecordError::MissingField("direction"))?;
        let direction = Direction::parse(direction_raw).ok_or_else(|| {
            RecordError::invalid("direction", format!("expected long or short, got {}", direction_raw))
        })?;

        let leverage = record
            .leverage
            .ok_or(RecordError::MissingField("leverage"))?;
        let leverage = Leverage::from_decimal(leverage)
            .ok_or_else(|| RecordError::invalid("leverage", "must be a positive integer"))?;

        let entry_date = record
            .entry_date
            .ok_or(RecordError::MissingField("entryDate"))?;
        let entry_price = non_negative(
            "entryPrice",
            record
                .entry_price
                .ok_or(RecordError::MissingField("entryPrice"))?,
        )?;
        let quantity = non_negative(
            "quantity",
            record.quantity.ok_or(RecordError::MissingField("quantity"))?,
        )?;
        let entry_fees = non_negative("entryFees", record.entry_fees.unwrap_or_default())?;
        bounded_notional("entryPrice", entry_price, quantity)?;

        let closed = match record.status.as_deref().map(str::trim) {
            None => false,
            Some(s) if s.eq_ignore_ascii_case("open") => false,
            Some(s) if s.eq_ignore_ascii_case("closed") => true,
            Some(other) => {
                return Err(RecordError::invalid(
                    "status",
                    format!("expected open or closed, got {}", other),
                ))
            }
        };

        let status = if closed {
            let price = non_negative(
                "exitPrice",
                record
                    .exit_price
                    .ok_or(RecordError::MissingField("exitPrice"))?,
            )?;
            let date = record
                .exit_date
                .ok_or(RecordError::MissingField("exitDate"))?;
            let fees = non_negative("exitFees", record.exit_fees.unwrap_or_default())?;
            bounded_notional("exitPrice", price, quantity)?;
            // A stored pnl was frozen at close and wins over recomputation.
            let pnl = match record.pnl {
                Some(pnl) => pnl,
                None => net_pnl(direction, entry_price, price, quantity, entry_fees, fees)
                    .ok_or_else(|| RecordError::invalid("pnl", "out of range"))?,
            };
            PositionStatus::Closed(Exit {
                date,
                price,
                fees,
                pnl,
            })
        } else {
            if record.exit_price.is_some() || record.exit_date.is_some() {
                return Err(RecordError::ExitOnOpenTrade);
            }
            PositionStatus::Open
        };

        let id = match record.id {
            Some(id) => RecordId::new(id.trim()),
            None => RecordId::new(content_key(
                "futures",
                &[
                    symbol.as_str(),
                    &direction.to_string(),
                    &entry_date.as_ms().to_string(),
                    &entry_price.to_canonical_string(),
                    &quantity.to_canonical_string(),
                ],
            )),
        };

        Ok(FuturesTrade {
            id,
            symbol,
            direction,
            leverage,
            entry_date,
            entry_price,
            quantity,
            entry_fees,
            notes: record.notes.unwrap_or_default(),
            status,
        })
    }
}
