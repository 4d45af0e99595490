use axum::http::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;
use tradejournal::api::{self, AppState};
use tradejournal::config::Config;
use tradejournal::datasource::MockPriceSource;
use tradejournal::db::init_db;
use tradejournal::query::SortConfig;
use tradejournal::{Ledger, Repository};

struct TestApp {
    app: axum::Router,
    repo: Arc<Repository>,
    db_path: String,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let state = AppState::new(
        Ledger::new(),
        repo.clone(),
        test_config(&db_path),
        Arc::new(MockPriceSource::new()),
    );

    TestApp {
        app: api::create_router(state),
        repo,
        db_path,
        _temp: temp_dir,
    }
}

async fn request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
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
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn test_config(db_path: &str) -> Config {
    Config {
        port: 0,
        database_path: db_path.to_string(),
        price_api_url: "http://example.invalid".to_string(),
        quote_currency: "usd".to_string(),
        default_sort: SortConfig::desc("entryDate"),
    }
}

/// Simulate a restart: a fresh pool, repository and ledger over the same file.
async fn reopen(db_path: &str) -> axum::Router {
    let pool = init_db(db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));
    let ledger = repo.load_ledger().await.expect("load_ledger failed");
    let state = AppState::new(
        ledger,
        repo,
        test_config(db_path),
        Arc::new(MockPriceSource::new()),
    );
    api::create_router(state)
}

async fn raw(app: &axum::Router, method: &str, uri: &str, body: String) -> (StatusCode, String, String) {
    let req = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::from(body))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn seed(app: &axum::Router) -> String {
    let (status, trade) = request(
        app,
        "POST",
        "/v1/futures/trades",
        Some(json!({
            "symbol": "BTCUSDT", "direction": "long", "leverage": 5, "entryDate": 0,
            "entryPrice": 100, "quantity": 2, "entryFees": 1, "notes": "breakout"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = trade["id"].as_str().unwrap().to_string();
    let (status, _) = request(
        app,
        "POST",
        &format!("/v1/futures/trades/{}/close", id),
        Some(json!({"exitPrice": 150, "exitFees": 1, "exitDate": 86_400_000})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    request(
        app,
        "POST",
        "/v1/spot/trades",
        Some(json!({
            "tradeDate": 5, "type": "buy", "baseAsset": "ETH", "quoteAsset": "USDT",
            "price": 2000, "quantityBase": 0.5
        })),
    )
    .await;
    request(app, "POST", "/v1/records/tasks", Some(json!({"id": "t1", "name": "Review journal"}))).await;
    id
}

#[tokio::test]
async fn test_state_survives_restart() {
    let test_app = setup_test_app().await;
    let id = seed(&test_app.app).await;

    let app = reopen(&test_app.db_path).await;
    let (status, json) = request(&app, "GET", "/v1/futures/trades", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["trades"][0]["id"], id.as_str());
    assert_eq!(json["trades"][0]["status"], "closed");
    assert_eq!(json["trades"][0]["pnl"], 98.0);

    // The reloaded trade is still closed: a second close is refused.
    let (status, _) = request(
        &app,
        "POST",
        &format!("/v1/futures/trades/{}/close", id),
        Some(json!({"exitPrice": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, json) = request(&app, "GET", "/v1/records/tasks", None).await;
    assert_eq!(json["records"][0]["name"], "Review journal");
}

#[tokio::test]
async fn test_export_json_snapshot() {
    let test_app = setup_test_app().await;
    seed(&test_app.app).await;

    let (status, content_type, body) = raw(&test_app.app, "GET", "/v1/export", String::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("application/json"));

    let snapshot: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(snapshot["version"], 1);
    assert!(snapshot["exportedAt"].is_string());
    assert_eq!(snapshot["futuresTrades"].as_array().unwrap().len(), 1);
    assert_eq!(snapshot["spotTrades"][0]["totalQuote"], 1000.0);
    assert_eq!(snapshot["tasks"][0]["id"], "t1");
    assert_eq!(snapshot["statuses"], json!([]));
}

#[tokio::test]
async fn test_export_csv() {
    let test_app = setup_test_app().await;
    seed(&test_app.app).await;

    let (status, content_type, body) =
        raw(&test_app.app, "GET", "/v1/export?format=csv", String::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "text/csv");

    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("id,symbol,direction,leverage,status"));
    assert!(lines[1].contains(",1d,"));
    assert!(lines[1].contains(",40,245,98,"));

    let (status, _, _) = raw(&test_app.app, "GET", "/v1/export?format=xml", String::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_import_replaces_ledger_and_storage() {
    let test_app = setup_test_app().await;
    seed(&test_app.app).await;

    let snapshot = json!({
        "version": 1,
        "futuresTrades": [
            {"id": "imported", "symbol": "SOLUSDT", "direction": "short", "leverage": "3",
             "entryDate": "2024-03-01T10:00:00Z", "entryPrice": "150", "quantity": "10"},
            {"id": "broken", "symbol": "SOLUSDT", "direction": "short", "status": "open",
             "exitPrice": 140, "leverage": 3, "entryDate": 1, "entryPrice": 1, "quantity": 1}
        ],
        "statuses": [{"id": 1, "name": "Todo"}]
    });
    let (status, _, body) =
        raw(&test_app.app, "POST", "/v1/import", snapshot.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    let report: Value = serde_json::from_str(&body).unwrap();
    let futures = report["collections"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["collection"] == "futures-trades")
        .unwrap();
    assert_eq!(futures["imported"], 1);
    assert_eq!(futures["skipped"], 1);

    let (_, json) = request(&test_app.app, "GET", "/v1/futures/trades", None).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["trades"][0]["id"], "imported");
    let (_, json) = request(&test_app.app, "GET", "/v1/spot/trades", None).await;
    assert_eq!(json["total"], 0);

    let ledger = test_app.repo.load_ledger().await.unwrap();
    assert_eq!(ledger.futures_trades().len(), 1);
    assert!(ledger.spot_trades().is_empty());
    assert_eq!(ledger.len(), 2);
}

#[tokio::test]
async fn test_imported_closed_trade_keeps_stored_pnl() {
    let test_app = setup_test_app().await;

    let snapshot = json!({
        "version": 1,
        "futuresTrades": [
            {"id": "legacy", "symbol": "BTCUSDT", "direction": "long", "leverage": 5,
             "entryDate": 1000, "entryPrice": 100, "quantity": 2, "entryFees": 1,
             "status": "closed", "exitDate": 2000, "exitPrice": 150, "exitFees": 1,
             "pnl": 97.99},
            {"id": "huge", "symbol": "BTCUSDT", "direction": "long", "leverage": 1,
             "entryDate": 1, "entryPrice": "1e20", "quantity": "1e20"}
        ]
    });
    let (status, _, body) =
        raw(&test_app.app, "POST", "/v1/import", snapshot.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    let report: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(report["collections"][0]["imported"], 1);
    assert_eq!(report["collections"][0]["skipped"], 1);

    let (status, json) = request(&test_app.app, "GET", "/v1/futures/trades", None).await;
    assert_eq!(status, StatusCode::OK);
    let trade = &json["trades"][0];
    assert_eq!(trade["id"], "legacy");
    assert_eq!(trade["pnl"], 97.99);
    assert_eq!(trade["margin"], 40.0);
    assert!((trade["roi"].as_f64().unwrap() - 244.975).abs() < 1e-9);

    let (_, stats) = request(&test_app.app, "GET", "/v1/futures/stats", None).await;
    assert_eq!(stats["totalPnl"], 97.99);
    assert_eq!(stats["pnlHistory"], json!([97.99]));

    let app = reopen(&test_app.db_path).await;
    let (_, json) = request(&app, "GET", "/v1/futures/trades", None).await;
    assert_eq!(json["trades"][0]["pnl"], 97.99);
}

#[tokio::test]
async fn test_import_rejects_garbage() {
    let test_app = setup_test_app().await;
    seed(&test_app.app).await;

    let (status, _, body) = raw(&test_app.app, "POST", "/v1/import", "[1, 2]".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("JSON object"));

    // Nothing was replaced.
    let (_, json) = request(&test_app.app, "GET", "/v1/futures/trades", None).await;
    assert_eq!(json["total"], 1);
}
