//! Domain types for the trade journal.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Domain primitives: TimeMs, RecordId, Symbol, Direction, SpotSide, Leverage
//! - Futures and spot trades with their flat document shapes
//! - Project-tracking records (tasks, costs, expenses, statuses, project names)
//! - Stable chronological ordering of trades

pub mod decimal;
pub mod futures;
pub mod key;
pub mod lenient;
pub mod ordering;
pub mod primitives;
pub mod record_error;
pub mod records;
pub mod spot;

pub use decimal::Decimal;
pub use futures::{net_pnl, Exit, FuturesTrade, FuturesTradeRecord, NewFuturesTrade, PositionStatus};
pub use ordering::{sort_trades_chronological, TradeOrderingKey};
pub use primitives::{Direction, Leverage, RecordId, SpotSide, Symbol, TimeMs};
pub use record_error::RecordError;
pub use records::{FixedExpense, ProjectCost, ProjectName, Status, Task};
pub use spot::{NewSpotTrade, SpotTrade, SpotTradeRecord, SpotTradeUpdate};
