use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::AppState;
use momentum_screener::{
    types::SourceHealth, universe, PriceHistoryProvider, ScoredStock,
};

/// Query params for the chart endpoint
#[derive(Debug, serde::Deserialize)]
pub struct ChartQuery {
    #[serde(default = "default_interval")]
    interval: String,
    #[serde(default = "default_period")]
    period: String,
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_period() -> String {
    "1mo".to_string()
}

/// GET /api/screener/momentum - Run (or serve the cached) screener ranking
pub async fn momentum_screener(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ScreenerResponse>, (StatusCode, Json<ScreenerErrorResponse>)> {
    if let Some(ref cache) = state.cache {
        if let Ok(Some(report)) = cache.get_report().await {
            info!("Serving cached screener report ({} stocks)", report.count);
            return Ok(Json(ScreenerResponse::from_report(report)));
        }
    }

    let universe = universe::default_universe();
    info!("Running momentum screener over {} symbols", universe.len());

    match state.screener.run(&universe).await {
        Ok(report) => {
            if let Some(ref cache) = state.cache {
                if let Err(e) = cache.set_report(&report).await {
                    warn!("Failed to cache screener report: {}", e);
                }
            }
            Ok(Json(ScreenerResponse::from_report(report)))
        }
        Err(e) => {
            warn!("Screener run failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ScreenerErrorResponse {
                    success: false,
                    error: e.to_string(),
                }),
            ))
        }
    }
}

/// GET /api/stock/:symbol - OHLCV chart bars keyed by Unix timestamp
pub async fn get_chart(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, (StatusCode, Json<NotFoundResponse>)> {
    let symbol = symbol.to_uppercase();

    if let Some(ref cache) = state.cache {
        if let Ok(Some(bars)) = cache.get_history(&symbol, &query.period, &query.interval).await {
            if !bars.is_empty() {
                return Ok(Json(ChartResponse::build(symbol, query, bars)));
            }
        }
    }

    let bars = match state
        .provider
        .fetch_history(&symbol, &query.period, &query.interval)
        .await
    {
        Ok(bars) => bars,
        Err(e) => {
            warn!("Chart fetch error for {}: {}", symbol, e);
            Vec::new()
        }
    };

    if bars.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(NotFoundResponse {
                error: true,
                message: format!("No data found for {}", symbol),
            }),
        ));
    }

    if let Some(ref cache) = state.cache {
        if let Err(e) = cache
            .set_history(&symbol, &query.period, &query.interval, &bars)
            .await
        {
            warn!("Failed to cache history for {}: {}", symbol, e);
        }
    }

    Ok(Json(ChartResponse::build(symbol, query, bars)))
}

/// GET /api/stocks/list - Static ticker directory
pub async fn list_stocks() -> Json<StockListResponse> {
    let stocks = universe::directory();
    Json(StockListResponse {
        success: true,
        count: stocks.len(),
        stocks,
    })
}

/// Query params for the batch price endpoint
#[derive(Debug, serde::Deserialize)]
pub struct PricesQuery {
    #[serde(default)]
    symbols: String,
}

/// Batch size cap for the price endpoint
const MAX_BATCH_SYMBOLS: usize = 10;

/// GET /api/stocks/prices?symbols=a,b,c - Latest quotes, per-symbol errors inline
pub async fn get_prices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PricesQuery>,
) -> Result<Json<PricesResponse>, (StatusCode, Json<NotFoundResponse>)> {
    if query.symbols.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(NotFoundResponse {
                error: true,
                message: "symbols parameter required".to_string(),
            }),
        ));
    }

    let mut prices = HashMap::new();
    for symbol in query
        .symbols
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_BATCH_SYMBOLS)
    {
        let sym = symbol.to_uppercase();
        let entry = match state.provider.latest_quote(&sym).await {
            Ok(quote) => PriceEntry::Quote {
                price: quote.price,
                currency: quote.currency,
            },
            Err(e) => {
                warn!("Quote error for {}: {}", sym, e);
                PriceEntry::Error {
                    error: e.to_string(),
                }
            }
        };
        prices.insert(sym, entry);
    }

    Ok(Json(PricesResponse {
        success: true,
        prices,
    }))
}

/// GET /health - Service health check
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let provider_health = state.provider.health().await;

    Json(HealthResponse {
        status: if provider_health.is_healthy {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        sources: vec![provider_health],
    })
}

// Response types
#[derive(Debug, serde::Serialize)]
pub struct ScreenerResponse {
    pub success: bool,
    pub stocks: Vec<ScoredStock>,
    pub count: usize,
    pub analyzed: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ScreenerResponse {
    fn from_report(report: momentum_screener::ScreenerReport) -> Self {
        Self {
            success: true,
            stocks: report.stocks,
            count: report.count,
            analyzed: report.analyzed,
            timestamp: report.timestamp,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ScreenerErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, serde::Serialize)]
pub struct ChartResponse {
    pub success: bool,
    pub symbol: String,
    pub interval: String,
    pub period: String,
    pub data: Vec<ChartPoint>,
    pub count: usize,
}

impl ChartResponse {
    fn build(symbol: String, query: ChartQuery, bars: Vec<momentum_screener::Bar>) -> Self {
        let data: Vec<ChartPoint> = bars
            .into_iter()
            .map(|b| ChartPoint {
                time: b.timestamp.timestamp(),
                open: b.open,
                high: b.high,
                low: b.low,
                close: b.close,
                volume: b.volume,
            })
            .collect();
        Self {
            success: true,
            symbol,
            interval: query.interval,
            period: query.period,
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ChartPoint {
    pub time: i64,
    pub open: rust_decimal::Decimal,
    pub high: rust_decimal::Decimal,
    pub low: rust_decimal::Decimal,
    pub close: rust_decimal::Decimal,
    pub volume: rust_decimal::Decimal,
}

#[derive(Debug, serde::Serialize)]
pub struct NotFoundResponse {
    pub error: bool,
    pub message: String,
}

#[derive(Debug, serde::Serialize)]
pub struct StockListResponse {
    pub success: bool,
    pub count: usize,
    pub stocks: Vec<momentum_screener::TickerInfo>,
}

#[derive(Debug, serde::Serialize)]
#[serde(untagged)]
pub enum PriceEntry {
    Quote {
        price: rust_decimal::Decimal,
        currency: String,
    },
    Error {
        error: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct PricesResponse {
    pub success: bool,
    pub prices: HashMap<String, PriceEntry>,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub sources: Vec<SourceHealth>,
}
