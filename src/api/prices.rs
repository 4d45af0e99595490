use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::AppState;
use crate::datasource::PriceMap;
use crate::domain::Symbol;
use crate::error::AppError;
use crate::store::Ledger;

#[derive(Debug, Default, Deserialize)]
pub struct PricesQuery {
    /// Comma-separated tickers. Defaults to the symbols of open positions
    /// and spot holdings.
    pub symbols: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PricesResponse {
    pub quote: String,
    pub prices: PriceMap,
}

fn parse_symbols(raw: &str) -> Vec<Symbol> {
    raw.split(',')
        .map(Symbol::new)
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn held_symbols(ledger: &Ledger) -> Vec<Symbol> {
    let open = ledger
        .futures_trades()
        .iter()
        .filter(|t| t.is_open())
        .map(|t| t.symbol.clone());
    let spot = ledger.spot_trades().iter().map(|t| t.base_asset.clone());
    open.chain(spot).collect::<BTreeSet<_>>().into_iter().collect()
}

pub async fn get_prices(
    Query(params): Query<PricesQuery>,
    State(state): State<AppState>,
) -> Result<Json<PricesResponse>, AppError> {
    let symbols = match params.symbols.as_deref() {
        Some(raw) => parse_symbols(raw),
        None => held_symbols(&*state.ledger.read().await),
    };

    let quote = state.config.quote_currency.clone();
    let prices = state.prices.fetch_prices(&symbols, &quote).await?;
    Ok(Json(PricesResponse { quote, prices }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols_dedups_and_normalizes() {
        let symbols = parse_symbols(" eth, BTC,,btc ");
        let names: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["BTC", "ETH"]);
    }
}
