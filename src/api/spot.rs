use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::{persist, AppState, ListQuery};
use crate::domain::{NewSpotTrade, RecordId, SpotTrade, SpotTradeUpdate, TimeMs};
use crate::engine::{calculate_spot_target_metrics, SpotTargetInput, SpotTargetMetrics};
use crate::error::AppError;
use crate::query::{filter_and_sort, SortConfig};

pub async fn list_trades(
    Query(params): Query<ListQuery>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let default = SortConfig::new("tradeDate", state.config.default_sort.direction);
    let sort = params.sort_config(default)?;
    let ledger = state.ledger.read().await;

    let all = ledger.spot_trades();
    let trades = filter_and_sort(all, params.search_term(), &sort);
    Ok(Json(serde_json::json!({
        "trades": trades,
        "total": all.len(),
    })))
}

pub async fn create_trade(
    State(state): State<AppState>,
    Json(request): Json<NewSpotTrade>,
) -> Result<(StatusCode, Json<SpotTrade>), AppError> {
    let trade = SpotTrade::create(request, RecordId::generate(), TimeMs::now())?;
    let id = trade.id.clone();

    let mut ledger = state.ledger.write().await;
    ledger.insert(trade.clone())?;
    persist(&state.repo, &mut ledger, &trade, |l| {
        let _ = l.remove::<SpotTrade>(&id);
    })
    .await?;

    info!(id = %trade.id, side = %trade.side, base = %trade.base_asset, "spot trade recorded");
    Ok((StatusCode::CREATED, Json(trade)))
}

pub async fn edit_trade(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(update): Json<SpotTradeUpdate>,
) -> Result<Json<SpotTrade>, AppError> {
    let id = RecordId::new(id);
    let mut ledger = state.ledger.write().await;
    let previous = ledger
        .get::<SpotTrade>(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("spot trade {}", id)))?;

    let edited = ledger.edit_spot_trade(&id, &update)?.clone();
    persist(&state.repo, &mut ledger, &edited, |l| {
        let _ = l.replace(previous);
    })
    .await?;

    Ok(Json(edited))
}

pub async fn delete_trade(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let id = RecordId::new(id);
    let mut ledger = state.ledger.write().await;
    if ledger.get::<SpotTrade>(&id).is_none() {
        return Err(AppError::NotFound(format!("spot trade {}", id)));
    }

    state.repo.delete_document::<SpotTrade>(&id).await?;
    ledger.remove::<SpotTrade>(&id)?;
    info!(%id, "spot trade deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Target sell price calculator. Bad input is reported in the body, never
/// as an HTTP error.
pub async fn target(Json(input): Json<SpotTargetInput>) -> Json<SpotTargetMetrics> {
    Json(calculate_spot_target_metrics(&input))
}
