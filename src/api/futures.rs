use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{persist, AppState, ListQuery};
use crate::domain::{Decimal, FuturesTrade, NewFuturesTrade, RecordId, TimeMs};
use crate::engine::{attach_metrics, compute_futures_portfolio_stats, PortfolioStats, TradeWithMetrics};
use crate::error::AppError;
use crate::query::filter_and_sort;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesTradesResponse<'a> {
    pub trades: Vec<&'a TradeWithMetrics>,
    /// Size of the collection before the search filter.
    pub total: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseRequest {
    pub exit_price: Decimal,
    #[serde(default)]
    pub exit_fees: Option<Decimal>,
    /// Defaults to now.
    #[serde(default)]
    pub exit_date: Option<TimeMs>,
}

pub async fn list_trades(
    Query(params): Query<ListQuery>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let sort = params.sort_config(state.config.default_sort.clone())?;
    let ledger = state.ledger.read().await;

    let enriched = attach_metrics(ledger.futures_trades());
    let trades = filter_and_sort(&enriched, params.search_term(), &sort);
    let body = serde_json::to_value(FuturesTradesResponse {
        trades,
        total: enriched.len(),
    })
    .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(body))
}

pub async fn create_trade(
    State(state): State<AppState>,
    Json(request): Json<NewFuturesTrade>,
) -> Result<(StatusCode, Json<TradeWithMetrics>), AppError> {
    let trade = FuturesTrade::open(request, RecordId::generate(), TimeMs::now())?;
    let id = trade.id.clone();

    let mut ledger = state.ledger.write().await;
    ledger.insert(trade.clone())?;
    persist(&state.repo, &mut ledger, &trade, |l| {
        let _ = l.remove::<FuturesTrade>(&id);
    })
    .await?;

    info!(id = %trade.id, symbol = %trade.symbol, "futures position opened");
    Ok((StatusCode::CREATED, Json(TradeWithMetrics::new(trade))))
}

pub async fn close_trade(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<CloseRequest>,
) -> Result<Json<TradeWithMetrics>, AppError> {
    let id = RecordId::new(id);
    let mut ledger = state.ledger.write().await;
    let previous = ledger
        .get::<FuturesTrade>(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("futures trade {}", id)))?;

    let closed = ledger
        .close_futures_trade(
            &id,
            request.exit_price,
            request.exit_fees.unwrap_or_default(),
            request.exit_date.unwrap_or_else(TimeMs::now),
        )?
        .clone();
    persist(&state.repo, &mut ledger, &closed, |l| {
        if let Some(slot) = l.futures_trades.iter_mut().find(|t| t.id == previous.id) {
            *slot = previous;
        }
    })
    .await?;

    info!(id = %closed.id, pnl = %closed.realized_pnl(), "futures position closed");
    Ok(Json(TradeWithMetrics::new(closed)))
}

pub async fn delete_trade(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let id = RecordId::new(id);
    let mut ledger = state.ledger.write().await;
    if ledger.get::<FuturesTrade>(&id).is_none() {
        return Err(AppError::NotFound(format!("futures trade {}", id)));
    }

    state.repo.delete_document::<FuturesTrade>(&id).await?;
    ledger.remove::<FuturesTrade>(&id)?;
    info!(%id, "futures trade deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_stats(State(state): State<AppState>) -> Json<PortfolioStats> {
    let ledger = state.ledger.read().await;
    Json(compute_futures_portfolio_stats(ledger.futures_trades()))
}
