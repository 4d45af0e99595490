//! Stable chronological ordering of futures trades.

use crate::domain::FuturesTrade;

/// Ordering key for trades.
///
/// Ordering: entry_date -> insertion index. Two trades opened at the same
/// instant keep the order in which they were recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TradeOrderingKey {
    /// Entry time in milliseconds (primary sort).
    pub entry_ms: i64,
    /// Position in the source collection (tie-breaker).
    pub index: usize,
}

impl TradeOrderingKey {
    pub fn new(trade: &FuturesTrade, index: usize) -> Self {
        TradeOrderingKey {
            entry_ms: trade.entry_date.as_ms(),
            index,
        }
    }
}

/// Borrow trades in chronological entry order.
pub fn sort_trades_chronological(trades: &[FuturesTrade]) -> Vec<&FuturesTrade> {
    let mut keyed: Vec<(TradeOrderingKey, &FuturesTrade)> = trades
        .iter()
        .enumerate()
        .map(|(index, trade)| (TradeOrderingKey::new(trade, index), trade))
        .collect();
    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, trade)| trade).collect()
}
