use axum::http::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;
use tradejournal::api::{self, AppState};
use tradejournal::config::Config;
use tradejournal::datasource::{MockPriceSource, PriceSource, PriceSourceError};
use tradejournal::db::init_db;
use tradejournal::domain::Decimal;
use tradejournal::query::SortConfig;
use tradejournal::{Ledger, Repository};

struct TestApp {
    app: axum::Router,
    _temp: TempDir,
}

async fn setup_test_app(prices: Arc<dyn PriceSource>) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let config = Config {
        port: 0,
        database_path: db_path,
        price_api_url: "http://example.invalid".to_string(),
        quote_currency: "usd".to_string(),
        default_sort: SortConfig::desc("entryDate"),
    };
    let state = AppState::new(Ledger::new(), repo, config, prices);

    TestApp {
        app: api::create_router(state),
        _temp: temp_dir,
    }
}

async fn request(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn mock_prices() -> Arc<dyn PriceSource> {
    Arc::new(
        MockPriceSource::new()
            .with_price("BTCUSDT", Decimal::from(64_000i64))
            .with_price("BTC", Decimal::from(64_000i64))
            .with_price("ETH", Decimal::from(3_100i64)),
    )
}

#[tokio::test]
async fn test_prices_for_explicit_symbols() {
    let test_app = setup_test_app(mock_prices()).await;
    let (status, json) = request(&test_app.app, "GET", "/v1/prices?symbols=btc,eth,doge", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["quote"], "usd");
    assert_eq!(json["prices"]["BTC"], 64000.0);
    assert_eq!(json["prices"]["ETH"], 3100.0);
    assert!(json["prices"].get("DOGE").is_none());
}

#[tokio::test]
async fn test_prices_default_to_held_symbols() {
    let test_app = setup_test_app(mock_prices()).await;
    request(
        &test_app.app,
        "POST",
        "/v1/futures/trades",
        Some(json!({
            "symbol": "BTCUSDT", "direction": "long", "leverage": 2,
            "entryPrice": 60000, "quantity": 0.1
        })),
    )
    .await;
    request(
        &test_app.app,
        "POST",
        "/v1/spot/trades",
        Some(json!({
            "type": "buy", "baseAsset": "ETH", "quoteAsset": "USDT",
            "price": 3000, "quantityBase": 1
        })),
    )
    .await;

    let (status, json) = request(&test_app.app, "GET", "/v1/prices", None).await;
    assert_eq!(status, StatusCode::OK);
    let prices = json["prices"].as_object().unwrap();
    assert_eq!(prices.len(), 2);
    assert_eq!(prices["BTCUSDT"], 64000.0);
    assert_eq!(prices["ETH"], 3100.0);
}

#[tokio::test]
async fn test_price_source_failure_is_bad_gateway() {
    let test_app =
        setup_test_app(Arc::new(MockPriceSource::failing(PriceSourceError::RateLimited))).await;
    let (status, json) = request(&test_app.app, "GET", "/v1/prices?symbols=BTC", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("Rate limited"));
}
