//! Pure computation engine: per-trade metrics, durations, spot targets and
//! portfolio statistics. Nothing here performs I/O or mutates its inputs.

pub mod duration;
pub mod metrics;
pub mod spot_target;
pub mod stats;

pub use duration::{format_duration, format_duration_text, DURATION_UNDER_MINUTE, DURATION_UNKNOWN};
pub use metrics::{
    attach_metrics, close_futures_position, compute_futures_metrics, compute_record_metrics,
    CloseRejected, FuturesMetrics, TradeWithMetrics,
};
pub use spot_target::{calculate_spot_target_metrics, SpotTargetError, SpotTargetInput, SpotTargetMetrics};
pub use stats::{compute_futures_portfolio_stats, PortfolioStats};
