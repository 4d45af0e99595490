//! Per-trade futures metrics and the open -> closed transition.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::{
    net_pnl, Decimal, Direction, Exit, FuturesTrade, FuturesTradeRecord, Leverage,
    PositionStatus, TimeMs,
};

/// Margin, ROI (percent of margin) and realized pnl of one position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FuturesMetrics {
    pub margin: Decimal,
    pub roi: Decimal,
    pub pnl: Decimal,
}

/// Why a close request was refused. The trade is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloseRejected {
    #[error("trade {0} is already closed")]
    AlreadyClosed(String),
    #[error("exit price must be greater than zero")]
    InvalidExitPrice,
    #[error("exit fees must not be negative")]
    InvalidExitFees,
    #[error("exit price and fees put the pnl out of range")]
    PnlOutOfRange,
}

/// Compute margin, ROI and pnl for a trade.
///
/// Open positions report zero pnl and ROI; there is no mark-to-market. A
/// closed trade reports its frozen pnl, and ROI is derived from that value.
pub fn compute_futures_metrics(trade: &FuturesTrade) -> FuturesMetrics {
    let margin = margin_of(trade.entry_price, trade.quantity, trade.leverage);
    let pnl = trade.realized_pnl();
    let roi = if trade.is_closed() {
        roi_of(pnl, margin)
    } else {
        Decimal::zero()
    };
    FuturesMetrics { margin, roi, pnl }
}

/// Compute metrics straight from a loosely typed document.
///
/// Never fails: a missing or unparsable entry price, quantity or leverage
/// (including leverage 0) yields zero margin and ROI with the stored pnl.
/// A closed record keeps its stored pnl when it has one. Any direction other
/// than "long" is priced as short.
pub fn compute_record_metrics(record: &FuturesTradeRecord) -> FuturesMetrics {
    let inputs = (
        record.entry_price,
        record.quantity,
        record.leverage.and_then(Leverage::from_decimal),
    );
    let (Some(entry_price), Some(quantity), Some(leverage)) = inputs else {
        debug!(id = ?record.id, "degraded metrics for incomplete trade record");
        return FuturesMetrics {
            margin: Decimal::zero(),
            roi: Decimal::zero(),
            pnl: record.pnl.unwrap_or_default(),
        };
    };

    let margin = margin_of(entry_price, quantity, leverage);
    let exit_price = match record.exit_price {
        Some(price) if record.is_closed() => price,
        _ => {
            return FuturesMetrics {
                margin,
                roi: Decimal::zero(),
                pnl: Decimal::zero(),
            }
        }
    };

    let direction = record
        .direction
        .as_deref()
        .and_then(Direction::parse)
        .unwrap_or(Direction::Short);
    let pnl = record
        .pnl
        .or_else(|| {
            net_pnl(
                direction,
                entry_price,
                exit_price,
                quantity,
                record.entry_fees.unwrap_or_default(),
                record.exit_fees.unwrap_or_default(),
            )
        })
        .unwrap_or_else(|| {
            debug!(id = ?record.id, "pnl out of range, reporting zero");
            Decimal::zero()
        });

    FuturesMetrics {
        margin,
        roi: roi_of(pnl, margin),
        pnl,
    }
}

/// Close an open position, freezing its net pnl.
///
/// Returns the updated trade; the input is not modified and nothing is
/// persisted. Closing a closed trade is rejected.
pub fn close_futures_position(
    trade: &FuturesTrade,
    exit_price: Decimal,
    exit_fees: Decimal,
    closed_at: TimeMs,
) -> Result<FuturesTrade, CloseRejected> {
    if trade.is_closed() {
        return Err(CloseRejected::AlreadyClosed(trade.id.to_string()));
    }
    if !exit_price.is_positive() {
        return Err(CloseRejected::InvalidExitPrice);
    }
    if exit_fees.is_negative() {
        return Err(CloseRejected::InvalidExitFees);
    }

    let pnl = net_pnl(
        trade.direction,
        trade.entry_price,
        exit_price,
        trade.quantity,
        trade.entry_fees,
        exit_fees,
    )
    .ok_or(CloseRejected::PnlOutOfRange)?;

    let mut closed = trade.clone();
    closed.status = PositionStatus::Closed(Exit {
        date: closed_at,
        price: exit_price,
        fees: exit_fees,
        pnl,
    });
    Ok(closed)
}

/// Zero when the notional does not fit in a decimal.
fn margin_of(entry_price: Decimal, quantity: Decimal, leverage: Leverage) -> Decimal {
    entry_price
        .checked_mul(quantity)
        .and_then(|notional| notional.checked_div(leverage.as_decimal()))
        .unwrap_or_default()
}

fn roi_of(pnl: Decimal, margin: Decimal) -> Decimal {
    if !margin.is_positive() {
        return Decimal::zero();
    }
    pnl.checked_div(margin)
        .and_then(|ratio| ratio.checked_mul(Decimal::hundred()))
        .unwrap_or_default()
}

/// A trade paired with its computed metrics, for listing and sorting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeWithMetrics {
    #[serde(flatten)]
    pub trade: FuturesTrade,
    pub margin: Decimal,
    pub roi: Decimal,
}

impl TradeWithMetrics {
    pub fn new(trade: FuturesTrade) -> Self {
        let metrics = compute_futures_metrics(&trade);
        TradeWithMetrics {
            trade,
            margin: metrics.margin,
            roi: metrics.roi,
        }
    }
}

/// Attach metrics to every trade, preserving order.
pub fn attach_metrics(trades: &[FuturesTrade]) -> Vec<TradeWithMetrics> {
    trades.iter().cloned().map(TradeWithMetrics::new).collect()
}
