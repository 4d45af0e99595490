//! HTTP price source for CoinGecko-compatible `simple/price` endpoints.

use super::{base_asset, PriceMap, PriceSource, PriceSourceError};
use crate::domain::{Decimal, Symbol};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Ticker -> CoinGecko coin id for the common majors. Anything else is looked
/// up by its lower-cased ticker.
const COIN_IDS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("SOL", "solana"),
    ("BNB", "binancecoin"),
    ("XRP", "ripple"),
    ("ADA", "cardano"),
    ("DOGE", "dogecoin"),
    ("AVAX", "avalanche-2"),
    ("DOT", "polkadot"),
    ("LINK", "chainlink"),
    ("MATIC", "matic-network"),
    ("LTC", "litecoin"),
    ("ARB", "arbitrum"),
    ("OP", "optimism"),
    ("USDT", "tether"),
    ("USDC", "usd-coin"),
];

fn coin_id(symbol: &Symbol) -> String {
    let base = base_asset(symbol);
    COIN_IDS
        .iter()
        .find(|(ticker, _)| *ticker == base.as_str())
        .map(|(_, id)| id.to_string())
        .unwrap_or_else(|| base.as_str().to_lowercase())
}

/// Price source backed by a public HTTP API.
#[derive(Debug, Clone)]
pub struct HttpPriceSource {
    client: Client,
    base_url: String,
    max_elapsed: Duration,
}

impl HttpPriceSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_elapsed: Duration::from_secs(30),
        }
    }

    /// Create with the public CoinGecko API URL.
    pub fn default_url() -> Self {
        Self::new(DEFAULT_PRICE_API_URL)
    }

    /// Cap on total time spent retrying one request.
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, PriceSourceError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_elapsed),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .get(url)
                .query(query)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(PriceSourceError::Network(e.to_string())))?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(PriceSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(PriceSourceError::Http {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(PriceSourceError::Http {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(PriceSourceError::Parse(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch_prices(
        &self,
        symbols: &[Symbol],
        quote: &str,
    ) -> Result<PriceMap, PriceSourceError> {
        if symbols.is_empty() {
            return Ok(PriceMap::new());
        }

        let ids: Vec<(Symbol, String)> = symbols.iter().map(|s| (s.clone(), coin_id(s))).collect();
        let mut id_list: Vec<&str> = ids.iter().map(|(_, id)| id.as_str()).collect();
        id_list.sort_unstable();
        id_list.dedup();
        let quote = quote.trim().to_lowercase();
        debug!(ids = ?id_list, %quote, "Fetching prices");

        let url = format!("{}/simple/price", self.base_url);
        let response = self
            .get_json(
                &url,
                &[("ids", id_list.join(",")), ("vs_currencies", quote.clone())],
            )
            .await?;

        parse_simple_price(&response, &ids, &quote)
    }
}

/// Parse `{"bitcoin": {"usd": 64000.5}, ...}` into a per-symbol map.
fn parse_simple_price(
    body: &serde_json::Value,
    ids: &[(Symbol, String)],
    quote: &str,
) -> Result<PriceMap, PriceSourceError> {
    let object = body
        .as_object()
        .ok_or_else(|| PriceSourceError::Parse("Expected object response".to_string()))?;

    let mut prices = PriceMap::new();
    for (symbol, id) in ids {
        let Some(value) = object.get(id).and_then(|entry| entry.get(quote)) else {
            debug!(%symbol, %id, "no quote returned");
            continue;
        };
        match Decimal::from_json_loose(value) {
            Some(price) => {
                prices.insert(symbol.clone(), price);
            }
            None => warn!(%symbol, %id, "unparsable quote: {}", value),
        }
    }
    Ok(prices)
}
