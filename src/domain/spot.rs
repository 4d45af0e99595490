//! Spot buy/sell executions. Always settled; no lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::key::content_key;
use crate::domain::lenient::{loose_decimal, loose_string, loose_time};
use crate::domain::record_error::{bounded_notional, non_negative, RecordError};
use crate::domain::{Decimal, RecordId, SpotSide, Symbol, TimeMs};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SpotTradeRecord", into = "SpotTradeRecord")]
pub struct SpotTrade {
    pub id: RecordId,
    pub trade_date: TimeMs,
    pub side: SpotSide,
    pub base_asset: Symbol,
    pub quote_asset: Symbol,
    pub price: Decimal,
    pub quantity_base: Decimal,
    pub fees: Decimal,
    pub notes: String,
}

impl SpotTrade {
    /// Create a spot trade from a request, validating amounts and tickers.
    pub fn create(
        request: NewSpotTrade,
        id: RecordId,
        traded_at: TimeMs,
    ) -> Result<Self, RecordError> {
        SpotTrade {
            id,
            trade_date: request.trade_date.unwrap_or(traded_at),
            side: request.side,
            base_asset: Symbol::new(&request.base_asset),
            quote_asset: Symbol::new(&request.quote_asset),
            price: request.price,
            quantity_base: request.quantity_base,
            fees: request.fees.unwrap_or_default(),
            notes: request.notes.unwrap_or_default(),
        }
        .validated()
    }

    /// Quote-currency value of the execution (price * base quantity).
    pub fn total_quote(&self) -> Decimal {
        self.price * self.quantity_base
    }

    fn validated(self) -> Result<Self, RecordError> {
        if self.base_asset.is_empty() {
            return Err(RecordError::MissingField("baseAsset"));
        }
        if self.quote_asset.is_empty() {
            return Err(RecordError::MissingField("quoteAsset"));
        }
        non_negative("price", self.price)?;
        non_negative("quantityBase", self.quantity_base)?;
        non_negative("fees", self.fees)?;
        bounded_notional("price", self.price, self.quantity_base)?;
        Ok(self)
    }
}

/// Request body for recording a spot execution.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSpotTrade {
    #[serde(default)]
    pub trade_date: Option<TimeMs>,
    #[serde(rename = "type")]
    pub side: SpotSide,
    pub base_asset: String,
    pub quote_asset: String,
    pub price: Decimal,
    pub quantity_base: Decimal,
    #[serde(default)]
    pub fees: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial edit of a spot trade; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotTradeUpdate {
    #[serde(default)]
    pub trade_date: Option<TimeMs>,
    #[serde(default, rename = "type")]
    pub side: Option<SpotSide>,
    #[serde(default)]
    pub base_asset: Option<String>,
    #[serde(default)]
    pub quote_asset: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub quantity_base: Option<Decimal>,
    #[serde(default)]
    pub fees: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SpotTradeUpdate {
    /// Produce the edited trade; the original is left untouched.
    pub fn apply(&self, trade: &SpotTrade) -> Result<SpotTrade, RecordError> {
        SpotTrade {
            id: trade.id.clone(),
            trade_date: self.trade_date.unwrap_or(trade.trade_date),
            side: self.side.unwrap_or(trade.side),
            base_asset: self
                .base_asset
                .as_deref()
                .map(Symbol::new)
                .unwrap_or_else(|| trade.base_asset.clone()),
            quote_asset: self
                .quote_asset
                .as_deref()
                .map(Symbol::new)
                .unwrap_or_else(|| trade.quote_asset.clone()),
            price: self.price.unwrap_or(trade.price),
            quantity_base: self.quantity_base.unwrap_or(trade.quantity_base),
            fees: self.fees.unwrap_or(trade.fees),
            notes: self.notes.clone().unwrap_or_else(|| trade.notes.clone()),
        }
        .validated()
    }
}

/// Flat document shape of a spot trade. `totalQuote` is written on output and
/// ignored on input, since it is always derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotTradeRecord {
    #[serde(default, deserialize_with = "loose_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "loose_time")]
    pub trade_date: Option<TimeMs>,
    #[serde(default, rename = "type", deserialize_with = "loose_string")]
    pub side: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub base_asset: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub quote_asset: Option<String>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub quantity_base: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub fees: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_string")]
    pub notes: Option<String>,
    #[serde(default, skip_deserializing)]
    pub total_quote: Option<Decimal>,
}

impl From<SpotTrade> for SpotTradeRecord {
    fn from(trade: SpotTrade) -> Self {
        let total_quote = trade.total_quote();
        SpotTradeRecord {
            id: Some(trade.id.0),
            trade_date: Some(trade.trade_date),
            side: Some(trade.side.to_string()),
            base_asset: Some(trade.base_asset.to_string()),
            quote_asset: Some(trade.quote_asset.to_string()),
            price: Some(trade.price),
            quantity_base: Some(trade.quantity_base),
            fees: Some(trade.fees),
            notes: Some(trade.notes),
            total_quote: Some(total_quote),
        }
    }
}

impl TryFrom<SpotTradeRecord> for SpotTrade {
    type Error = RecordError;

    fn try_from(record: SpotTradeRecord) -> Result<Self, Self::Error> {
        let trade_date = record
            .trade_date
            .ok_or(RecordError::MissingField("tradeDate"))?;
        let side_raw = record.side.as_deref().ok_or(RecordError::MissingField("type"))?;
        let side = SpotSide::parse(side_raw).ok_or_else(|| {
            RecordError::invalid("type", format!("expected buy or sell, got {}", side_raw))
        })?;
        let base_asset = Symbol::new(record.base_asset.as_deref().unwrap_or_default());
        let quote_asset = Symbol::new(record.quote_asset.as_deref().unwrap_or_default());
        let price = record.price.ok_or(RecordError::MissingField("price"))?;
        let quantity_base = record
            .quantity_base
            .ok_or(RecordError::MissingField("quantityBase"))?;
        let fees = record.fees.unwrap_or_default();

        let id = match record.id {
            Some(id) => RecordId::new(id.trim()),
            None => RecordId::new(content_key(
                "spot",
                &[
                    &trade_date.as_ms().to_string(),
                    &side.to_string(),
                    base_asset.as_str(),
                    quote_asset.as_str(),
                    &price.to_canonical_string(),
                    &quantity_base.to_canonical_string(),
                    &fees.to_canonical_string(),
                ],
            )),
        };

        SpotTrade {
            id,
            trade_date,
            side,
            base_asset,
            quote_asset,
            price,
            quantity_base,
            fees,
            notes: record.notes.unwrap_or_default(),
        }
        .validated()
    }
}
