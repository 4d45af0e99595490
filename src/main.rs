use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tradejournal::{api, config::Config, db::init_db, HttpPriceSource, PriceSource, Repository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("Configuration error")?;
    let port = config.port;

    let pool = init_db(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    let repo = Arc::new(Repository::new(pool));
    let ledger = repo.load_ledger().await.context("Failed to load ledger")?;

    let prices: Arc<dyn PriceSource> = Arc::new(HttpPriceSource::new(config.price_api_url.clone()));
    let app = api::create_router(api::AppState::new(ledger, repo, config, prices));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
