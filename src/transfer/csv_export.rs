//! Spreadsheet-friendly CSV of futures trades with computed metrics.

use serde::Serialize;

use super::TransferError;
use crate::domain::FuturesTrade;
use crate::engine::{compute_futures_metrics, format_duration};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FuturesCsvRow {
    id: String,
    symbol: String,
    direction: String,
    leverage: u32,
    status: &'static str,
    entry_date: String,
    exit_date: Option<String>,
    duration: String,
    entry_price: String,
    exit_price: Option<String>,
    quantity: String,
    entry_fees: String,
    exit_fees: Option<String>,
    margin: String,
    roi: String,
    pnl: String,
    notes: String,
}

impl From<&FuturesTrade> for FuturesCsvRow {
    fn from(trade: &FuturesTrade) -> Self {
        let metrics = compute_futures_metrics(trade);
        let exit = trade.exit();
        FuturesCsvRow {
            id: trade.id.to_string(),
            symbol: trade.symbol.to_string(),
            direction: trade.direction.to_string(),
            leverage: trade.leverage.get(),
            status: trade.status.label(),
            entry_date: trade.entry_date.to_rfc3339(),
            exit_date: exit.map(|e| e.date.to_rfc3339()),
            duration: format_duration(Some(trade.entry_date), exit.map(|e| e.date)),
            entry_price: trade.entry_price.to_canonical_string(),
            exit_price: exit.map(|e| e.price.to_canonical_string()),
            quantity: trade.quantity.to_canonical_string(),
            entry_fees: trade.entry_fees.to_canonical_string(),
            exit_fees: exit.map(|e| e.fees.to_canonical_string()),
            margin: metrics.margin.round_dp(2).to_canonical_string(),
            roi: metrics.roi.round_dp(2).to_canonical_string(),
            pnl: metrics.pnl.to_canonical_string(),
            notes: trade.notes.clone(),
        }
    }
}

/// Write one row per trade, in the given order, with a header line.
pub fn export_futures_csv(trades: &[FuturesTrade]) -> Result<String, TransferError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for trade in trades {
        writer.serialize(FuturesCsvRow::from(trade))?;
    }
    if trades.is_empty() {
        writer.write_record(HEADER)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| TransferError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TransferError::Csv(e.to_string()))
}

const HEADER: [&str; 17] = [
    "id",
    "symbol",
    "direction",
    "leverage",
    "status",
    "entryDate",
    "exitDate",
    "duration",
    "entryPrice",
    "exitPrice",
    "quantity",
    "entryFees",
    "exitFees",
    "margin",
    "roi",
    "pnl",
    "notes",
];
