//! Portfolio-level statistics over futures trades.

use serde::Serialize;

use crate::domain::{sort_trades_chronological, Decimal, FuturesTrade};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
    /// Sum of realized pnl over closed trades.
    pub total_pnl: Decimal,
    /// Percentage of closed trades with positive pnl.
    pub win_rate: Decimal,
    /// Number of closed trades.
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Running cumulative pnl, one point per closed trade, in entry order.
    pub pnl_history: Vec<Decimal>,
    /// Entry plus exit fees over closed trades.
    pub total_fees: Decimal,
    /// Number of positions still open.
    pub open_positions: usize,
}

/// Aggregate realized results. Open positions only count toward
/// `open_positions`; a closed trade with exactly zero pnl is neither a win
/// nor a loss.
pub fn compute_futures_portfolio_stats(trades: &[FuturesTrade]) -> PortfolioStats {
    let mut stats = PortfolioStats::default();
    let mut running = Decimal::zero();

    for trade in sort_trades_chronological(trades) {
        let Some(exit) = trade.exit() else {
            stats.open_positions += 1;
            continue;
        };

        stats.total_trades += 1;
        if exit.pnl.is_positive() {
            stats.winning_trades += 1;
        } else if exit.pnl.is_negative() {
            stats.losing_trades += 1;
        }

        running = running + exit.pnl;
        stats.pnl_history.push(running);
        stats.total_fees = stats.total_fees + trade.total_fees();
    }

    stats.total_pnl = running;
    stats.win_rate = if stats.total_trades == 0 {
        Decimal::zero()
    } else {
        Decimal::from(stats.winning_trades) / Decimal::from(stats.total_trades)
            * Decimal::hundred()
    };

    stats
}
