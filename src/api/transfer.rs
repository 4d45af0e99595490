use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use super::AppState;
use crate::domain::TimeMs;
use crate::error::AppError;
use crate::transfer::{export_futures_csv, export_json, import_json, ImportReport};

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    /// `json` (default) or `csv` (futures trades only).
    pub format: Option<String>,
}

pub async fn export(
    Query(params): Query<ExportQuery>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let ledger = state.ledger.read().await;
    match params.format.as_deref().unwrap_or("json") {
        "json" => {
            let body = export_json(&ledger, TimeMs::now())?;
            Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
        }
        "csv" => {
            let body = export_futures_csv(ledger.futures_trades())?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"futures-trades.csv\"",
                    ),
                ],
                body,
            )
                .into_response())
        }
        other => Err(AppError::BadRequest(format!(
            "format must be json or csv, got {}",
            other
        ))),
    }
}

/// Replace the whole ledger with an uploaded snapshot.
///
/// The database is rewritten first; memory is only swapped after that
/// succeeds.
pub async fn import(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportReport>, AppError> {
    let (imported, report) = import_json(&body)?;

    let mut ledger = state.ledger.write().await;
    state.repo.replace_all(&imported).await?;
    *ledger = imported;

    info!(
        imported = report.imported(),
        skipped = report.skipped(),
        "snapshot imported"
    );
    Ok(Json(report))
}
