//! Price source abstraction for display-only market quotes.

use crate::domain::{Decimal, Symbol};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub mod coingecko;
pub mod mock;

pub use coingecko::HttpPriceSource;
pub use mock::MockPriceSource;

/// Latest quote per requested symbol. Symbols the source does not know are
/// simply absent.
pub type PriceMap = BTreeMap<Symbol, Decimal>;

/// Source of current market prices.
///
/// Implementations handle retry/backoff themselves; callers see one result.
#[async_trait]
pub trait PriceSource: Send + Sync + fmt::Debug {
    /// Fetch prices for `symbols` quoted in `quote` (e.g. "usd").
    async fn fetch_prices(
        &self,
        symbols: &[Symbol],
        quote: &str,
    ) -> Result<PriceMap, PriceSourceError>;
}

/// Error type for price source operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceSourceError {
    /// Connection failure, timeout, DNS.
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    /// The body was not the expected JSON shape.
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Rate limited")]
    RateLimited,
}

/// Strip a trailing quote currency or contract suffix from a trading pair:
/// "BTCUSDT" -> "BTC", "ETH-PERP" -> "ETH". Bare tickers pass through.
pub fn base_asset(symbol: &Symbol) -> Symbol {
    let raw = symbol.as_str();
    let trimmed = raw
        .trim_end_matches("-PERP")
        .trim_end_matches("PERP")
        .trim_end_matches(['-', '/', '_']);
    for suffix in ["USDT", "USDC", "BUSD", "USD"] {
        if let Some(base) = trimmed.strip_suffix(suffix) {
            let base = base.trim_end_matches(['-', '/', '_']);
            if !base.is_empty() {
                return Symbol::new(base);
            }
        }
    }
    Symbol::new(trimmed)
}
