use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber;

use momentum_screener::types::PriceHistoryProvider;
use momentum_screener::{cache::RedisCache, config::Settings, screener, Screener};

/// Application state shared across handlers
pub struct AppState {
    pub provider: Arc<momentum_screener::YahooFinanceClient>,
    pub screener: Screener,
    pub cache: Option<RedisCache>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting Momentum Screener Service...");

    let settings = Settings::load()?;

    // Initialize Yahoo Finance client
    let provider = Arc::new(momentum_screener::YahooFinanceClient::with_base_url(
        &settings.provider_base_url,
    ));
    info!("✓ Yahoo Finance client initialized");

    // Redis cache is optional - the screener recomputes on every request without it
    let cache = match settings.redis_url.as_deref() {
        Some(url) => match RedisCache::new(url).await {
            Ok(cache) => {
                info!("✓ Redis cache connected");
                Some(cache)
            }
            Err(e) => {
                warn!("⚠ Redis unavailable ({}), continuing without cache", e);
                None
            }
        },
        None => None,
    };

    // Build the screener with the configured pattern strategy
    let scorer = screener::scorer_for(&settings.pattern_strategy);
    info!("✓ Pattern scorer: {}", scorer.name());

    let screener = Screener::new(
        Arc::clone(&provider) as Arc<dyn PriceHistoryProvider>,
        scorer,
    )
    .with_config(settings.screener_config());

    // Create app state
    let state = Arc::new(AppState {
        provider,
        screener,
        cache,
    });

    // Build router
    let app = Router::new()
        .route("/api/screener/momentum", get(handlers::momentum_screener))
        .route("/api/stock/:symbol", get(handlers::get_chart))
        .route("/api/stocks/list", get(handlers::list_stocks))
        .route("/api/stocks/prices", get(handlers::get_prices))
        .route("/health", get(handlers::health_check))
        .layer(CorsLayer::new().allow_origin(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", settings.port)).await?;
    info!(
        "🚀 Momentum Screener Service listening on port {}",
        settings.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}

mod handlers;
