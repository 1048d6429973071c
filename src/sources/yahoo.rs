use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::types::*;

const YAHOO_CHART_BASE: &str = "https://query1.finance.yahoo.com";

/// Internal health tracking for API-free health checks
struct HealthTracker {
    /// Timestamp of last successful request (millis since epoch)
    last_success_ms: AtomicU64,
    /// Timestamp of last failed request (millis since epoch)
    last_failure_ms: AtomicU64,
    success_count: AtomicU64,
    failure_count: AtomicU64,
    /// Last known latency in ms
    last_latency_ms: AtomicU64,
}

impl HealthTracker {
    fn new() -> Self {
        Self {
            last_success_ms: AtomicU64::new(0),
            last_failure_ms: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            last_latency_ms: AtomicU64::new(0),
        }
    }

    fn record_success(&self, latency_ms: u64) {
        let now_ms = Utc::now().timestamp_millis() as u64;
        self.last_success_ms.store(now_ms, Ordering::Relaxed);
        self.last_latency_ms.store(latency_ms, Ordering::Relaxed);
        self.success_count.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        let now_ms = Utc::now().timestamp_millis() as u64;
        self.last_failure_ms.store(now_ms, Ordering::Relaxed);
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    fn is_healthy(&self) -> bool {
        let last_success = self.last_success_ms.load(Ordering::Relaxed);
        let last_failure = self.last_failure_ms.load(Ordering::Relaxed);

        // Healthy if: at least one success AND (no failures OR success is more recent)
        last_success > 0 && (last_failure == 0 || last_success > last_failure)
    }

    fn success_rate(&self) -> f64 {
        let successes = self.success_count.load(Ordering::Relaxed);
        let failures = self.failure_count.load(Ordering::Relaxed);
        let total = successes + failures;
        if total == 0 {
            return 1.0; // No requests yet, assume healthy
        }
        successes as f64 / total as f64
    }
}

/// Yahoo Finance chart API client
///
/// Unauthenticated endpoint with informal rate limits; one concurrent
/// request with a minimum inter-request delay keeps us well under them.
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
    rate_limiter: tokio::sync::Semaphore,
    last_request: tokio::sync::Mutex<Instant>,
    /// Internal health tracking to avoid API calls in health()
    health_tracker: HealthTracker,
}

impl YahooFinanceClient {
    pub fn new() -> Self {
        Self::with_base_url(YAHOO_CHART_BASE)
    }

    /// Override the base URL (used by tests against a mock server)
    pub fn with_base_url(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent("momentum-screener/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: tokio::sync::Semaphore::new(1),
            last_request: tokio::sync::Mutex::new(Instant::now() - Duration::from_secs(10)),
            health_tracker: HealthTracker::new(),
        }
    }

    /// Per-request timeout (10 seconds for individual API calls)
    const REQUEST_TIMEOUT_SECS: u64 = 10;

    /// Rate-limited request wrapper with per-request timeout
    async fn rate_limited_request<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<T> {
        let request_start = Instant::now();

        let _permit = self.rate_limiter.acquire().await.map_err(|e| {
            self.health_tracker.record_failure();
            ScreenerError::ApiError(e.to_string())
        })?;

        // Ensure minimum delay between requests
        {
            let mut last = self.last_request.lock().await;
            let elapsed = last.elapsed();
            if elapsed < Duration::from_millis(100) {
                tokio::time::sleep(Duration::from_millis(100) - elapsed).await;
            }
            *last = Instant::now();
        }

        let url = format!("{}{}", self.base_url, endpoint);
        let request_future = self.client.get(&url).send();
        let response = match tokio::time::timeout(
            Duration::from_secs(Self::REQUEST_TIMEOUT_SECS),
            request_future,
        )
        .await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                self.health_tracker.record_failure();
                return Err(ScreenerError::ApiError(e.to_string()));
            }
            Err(_) => {
                self.health_tracker.record_failure();
                return Err(ScreenerError::ApiError(format!(
                    "Yahoo request to {} timed out after {}s",
                    endpoint,
                    Self::REQUEST_TIMEOUT_SECS
                )));
            }
        };

        let status = response.status();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            self.health_tracker.record_failure();
            return Err(ScreenerError::RateLimit {
                source: "yahoo".to_string(),
                retry_after,
            });
        }

        if !status.is_success() {
            self.health_tracker.record_failure();
            let text = response.text().await.unwrap_or_default();
            return Err(ScreenerError::ApiError(format!(
                "Yahoo API error ({}): {}",
                status, text
            )));
        }

        let latency_ms = request_start.elapsed().as_millis() as u64;
        self.health_tracker.record_success(latency_ms);

        response.json::<T>().await.map_err(|e| {
            self.health_tracker.record_failure();
            ScreenerError::InvalidResponse(e.to_string())
        })
    }

    async fn fetch_chart(&self, symbol: &str, range: &str, interval: &str) -> Result<ChartResult> {
        let endpoint = format!(
            "/v8/finance/chart/{}?range={}&interval={}",
            symbol, range, interval
        );
        let response: ChartResponse = self.rate_limited_request(&endpoint).await?;

        if let Some(error) = response.chart.error {
            return Err(ScreenerError::ApiError(format!(
                "Yahoo chart error for {}: {}",
                symbol, error
            )));
        }

        response
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| ScreenerError::SymbolNotFound(symbol.to_string()))
    }

    /// Convert a chart result to bars, dropping rows with missing fields
    ///
    /// Missing data shortens the series; nothing is filled or interpolated.
    fn bars_from_chart(result: &ChartResult) -> Vec<Bar> {
        let Some(quote) = result.indicators.quote.first() else {
            return Vec::new();
        };

        result
            .timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let timestamp = DateTime::from_timestamp(ts, 0)?;
                let open = quote.open.get(i).copied().flatten()?;
                let high = quote.high.get(i).copied().flatten()?;
                let low = quote.low.get(i).copied().flatten()?;
                let close = quote.close.get(i).copied().flatten()?;
                if !close.is_finite() || close <= 0.0 {
                    return None;
                }
                let volume = quote.volume.get(i).copied().flatten().unwrap_or(0);

                Some(Bar {
                    timestamp,
                    open: Decimal::try_from(open).ok()?,
                    high: Decimal::try_from(high).ok()?,
                    low: Decimal::try_from(low).ok()?,
                    close: Decimal::try_from(close).ok()?,
                    volume: Decimal::from(volume),
                })
            })
            .collect()
    }

    /// Latest quote for the batch price endpoint
    ///
    /// Prefers the chart meta's regular market price, falling back to the
    /// last close of a short daily history.
    pub async fn latest_quote(&self, symbol: &str) -> Result<Quote> {
        let result = self.fetch_chart(symbol, "5d", "1d").await?;
        let currency = result
            .meta
            .currency
            .clone()
            .unwrap_or_else(|| "USD".to_string());

        let price = match result.meta.regular_market_price {
            Some(p) if p.is_finite() && p > 0.0 => Decimal::try_from(p)
                .map_err(|e| ScreenerError::InvalidResponse(e.to_string()))?,
            _ => Self::bars_from_chart(&result)
                .last()
                .map(|b| b.close)
                .ok_or_else(|| ScreenerError::SymbolNotFound(symbol.to_string()))?,
        };

        Ok(Quote {
            symbol: symbol.to_string(),
            price,
            currency,
            timestamp: Utc::now(),
        })
    }

    /// Get health status using internal metrics (no API call)
    pub async fn health(&self) -> SourceHealth {
        let last_success_ms = self.health_tracker.last_success_ms.load(Ordering::Relaxed);
        let last_success = if last_success_ms > 0 {
            DateTime::from_timestamp_millis(last_success_ms as i64)
        } else {
            None
        };

        let is_healthy = self.health_tracker.is_healthy();

        SourceHealth {
            source: "yahoo".to_string(),
            is_healthy,
            last_success,
            last_error: if is_healthy {
                None
            } else {
                Some("Recent failures detected".to_string())
            },
            success_rate_24h: self.health_tracker.success_rate(),
            avg_latency_ms: self.health_tracker.last_latency_ms.load(Ordering::Relaxed),
        }
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PriceHistoryProvider for YahooFinanceClient {
    async fn fetch_history(&self, symbol: &str, range: &str, interval: &str) -> Result<Vec<Bar>> {
        let result = self.fetch_chart(symbol, range, interval).await?;
        Ok(Self::bars_from_chart(&result))
    }

    async fn health(&self) -> SourceHealth {
        YahooFinanceClient::health(self).await
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

// Response types for the Yahoo chart API
#[derive(Debug, serde::Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, serde::Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ChartMeta {
    #[serde(default)]
    currency: Option<String>,
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<f64>,
}

#[derive(Debug, serde::Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bars_skip_null_rows() {
        let result = ChartResult {
            meta: ChartMeta::default(),
            timestamp: vec![1_700_000_000, 1_700_086_400, 1_700_172_800],
            indicators: Indicators {
                quote: vec![QuoteBlock {
                    open: vec![Some(10.0), None, Some(12.0)],
                    high: vec![Some(11.0), Some(11.5), Some(13.0)],
                    low: vec![Some(9.0), Some(10.0), Some(11.0)],
                    close: vec![Some(10.5), Some(11.0), Some(12.5)],
                    volume: vec![Some(1000), Some(1100), None],
                }],
            },
        };

        let bars = YahooFinanceClient::bars_from_chart(&result);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, Decimal::try_from(10.5).unwrap());
        // Missing volume defaults to zero rather than dropping the bar
        assert_eq!(bars[1].volume, Decimal::ZERO);
    }

    #[test]
    fn test_bars_empty_without_quote_block() {
        let result = ChartResult {
            meta: ChartMeta::default(),
            timestamp: vec![1_700_000_000],
            indicators: Indicators { quote: vec![] },
        };
        assert!(YahooFinanceClient::bars_from_chart(&result).is_empty());
    }
}
