pub mod futures;
pub mod health;
pub mod prices;
pub mod records;
pub mod spot;
pub mod transfer;

use crate::config::Config;
use crate::datasource::PriceSource;
use crate::db::Repository;
use crate::error::AppError;
use crate::query::{SortConfig, SortDirection};
use crate::store::{Document, Ledger};
use axum::{
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<Ledger>>,
    pub repo: Arc<Repository>,
    pub config: Config,
    pub prices: Arc<dyn PriceSource>,
}

impl AppState {
    pub fn new(
        ledger: Ledger,
        repo: Arc<Repository>,
        config: Config,
        prices: Arc<dyn PriceSource>,
    ) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            repo,
            config,
            prices,
        }
    }
}

/// Shared `?search&sortKey&sortDir` parameters of list endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort_key: Option<String>,
    pub sort_dir: Option<String>,
}

impl ListQuery {
    pub fn search_term(&self) -> &str {
        self.search.as_deref().unwrap_or("")
    }

    /// Resolve the requested sort against a per-collection default.
    pub fn sort_config(&self, default: SortConfig) -> Result<SortConfig, AppError> {
        let key = self
            .sort_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .unwrap_or(default.key);
        let direction = match self.sort_dir.as_deref() {
            None | Some("") => default.direction,
            Some(raw) => raw.parse::<SortDirection>().map_err(|_| {
                AppError::BadRequest(format!("sortDir must be asc or desc, got {}", raw))
            })?,
        };
        Ok(SortConfig::new(key, direction))
    }
}

/// Write `doc` through to the database. When the write fails the in-memory
/// change is undone with `revert` so the ledger never runs ahead of storage.
pub(crate) async fn persist<T: Document>(
    repo: &Repository,
    ledger: &mut Ledger,
    doc: &T,
    revert: impl FnOnce(&mut Ledger),
) -> Result<(), AppError> {
    if let Err(e) = repo.put_document(doc).await {
        warn!(collection = %T::COLLECTION, id = %doc.id(), error = %e, "write failed, reverting");
        revert(ledger);
        return Err(e.into());
    }
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/v1/futures/trades",
            get(futures::list_trades).post(futures::create_trade),
        )
        .route(
            "/v1/futures/trades/:id",
            axum::routing::delete(futures::delete_trade),
        )
        .route("/v1/futures/trades/:id/close", post(futures::close_trade))
        .route("/v1/futures/stats", get(futures::get_stats))
        .route(
            "/v1/spot/trades",
            get(spot::list_trades).post(spot::create_trade),
        )
        .route(
            "/v1/spot/trades/:id",
            axum::routing::patch(spot::edit_trade).delete(spot::delete_trade),
        )
        .route("/v1/spot/target", post(spot::target))
        .route(
            "/v1/records/:collection",
            get(records::list_records).post(records::create_record),
        )
        .route(
            "/v1/records/:collection/:id",
            axum::routing::put(records::replace_record).delete(records::delete_record),
        )
        .route("/v1/export", get(transfer::export))
        .route("/v1/import", post(transfer::import))
        .route("/v1/prices", get(prices::get_prices))
        .layer(cors)
        .with_state(state)
}
