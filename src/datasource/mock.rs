//! Mock price source for testing without network calls.

use super::{PriceMap, PriceSource, PriceSourceError};
use crate::domain::{Decimal, Symbol};
use async_trait::async_trait;

/// Serves fixed prices, or a fixed error.
#[derive(Debug, Clone, Default)]
pub struct MockPriceSource {
    prices: PriceMap,
    error: Option<PriceSourceError>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a price for a symbol.
    pub fn with_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.prices.insert(Symbol::new(symbol), price);
        self
    }

    /// Fail every request with `error`.
    pub fn failing(error: PriceSourceError) -> Self {
        Self {
            prices: PriceMap::new(),
            error: Some(error),
        }
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn fetch_prices(
        &self,
        symbols: &[Symbol],
        _quote: &str,
    ) -> Result<PriceMap, PriceSourceError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        Ok(symbols
            .iter()
            .filter_map(|s| self.prices.get(s).map(|p| (s.clone(), *p)))
            .collect())
    }
}
