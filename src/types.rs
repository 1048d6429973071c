use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Single daily OHLCV bar from a price-history provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Latest quote for a symbol (batch price endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: Decimal,
    pub currency: String,
    pub timestamp: DateTime<Utc>,
}

/// Static ticker-directory record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerInfo {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub sector: String,
    pub industry: String,
}

/// Named lookback window in trading days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeframeWindow {
    Month1,
    Month2,
    Month3,
    Month6,
    Year1,
}

impl TimeframeWindow {
    /// All windows evaluated per symbol, shortest first
    pub const ALL: [TimeframeWindow; 5] = [
        TimeframeWindow::Month1,
        TimeframeWindow::Month2,
        TimeframeWindow::Month3,
        TimeframeWindow::Month6,
        TimeframeWindow::Year1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeframeWindow::Month1 => "1M",
            TimeframeWindow::Month2 => "2M",
            TimeframeWindow::Month3 => "3M",
            TimeframeWindow::Month6 => "6M",
            TimeframeWindow::Year1 => "1Y",
        }
    }

    /// Window length in trading days (~21 per month)
    pub fn trading_days(&self) -> usize {
        match self {
            TimeframeWindow::Month1 => 21,
            TimeframeWindow::Month2 => 42,
            TimeframeWindow::Month3 => 63,
            TimeframeWindow::Month6 => 126,
            TimeframeWindow::Year1 => 252,
        }
    }
}

/// One ranked screener candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredStock {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub current_price: Decimal,
    /// Average exponential-pattern quality across qualifying windows, 0-100
    pub pattern_score: f64,
    /// Projected 6-month forward gain percentage, 0-500
    pub potential_return: f64,
    /// 0.3 x pattern_score + 0.7 x potential_return
    pub final_score: f64,
    /// 1-based position after sorting and truncation
    pub rank: usize,
    pub timeframe_scores: BTreeMap<String, f64>,
    pub projected_price: Decimal,
}

/// Result of one full screener run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerReport {
    pub stocks: Vec<ScoredStock>,
    /// Symbols that survived scoring, filtering and truncation
    pub count: usize,
    /// Symbols attempted (including skips)
    pub analyzed: usize,
    pub timestamp: DateTime<Utc>,
}

/// Data source health/status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceHealth {
    pub source: String,
    pub is_healthy: bool,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub success_rate_24h: f64,
    pub avg_latency_ms: u64,
}

/// Error types for screener operations
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded for {source}")]
    RateLimit {
        r#source: String,
        retry_after: Option<u64>,
    },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Insufficient history for {symbol}: {bars} bars")]
    InsufficientData { symbol: String, bars: usize },

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Screener run failed: {0}")]
    SystemicFailure(String),
}

/// Result type for screener operations
pub type Result<T> = std::result::Result<T, ScreenerError>;

/// Trait for price-history providers
///
/// All provider failures are treated uniformly as "no data available";
/// callers decide whether that is a per-symbol skip or a systemic fault.
#[async_trait::async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Fetch daily bars for a lookback range (e.g. "1y", "1mo"), oldest first
    async fn fetch_history(&self, symbol: &str, range: &str, interval: &str) -> Result<Vec<Bar>>;

    /// Get provider health status
    async fn health(&self) -> SourceHealth;

    /// Provider name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_days() {
        assert_eq!(TimeframeWindow::Month1.trading_days(), 21);
        assert_eq!(TimeframeWindow::Year1.trading_days(), 252);
        assert_eq!(TimeframeWindow::ALL.len(), 5);
    }

    #[test]
    fn test_window_names_unique() {
        let names: std::collections::HashSet<_> =
            TimeframeWindow::ALL.iter().map(|w| w.as_str()).collect();
        assert_eq!(names.len(), TimeframeWindow::ALL.len());
    }
}
