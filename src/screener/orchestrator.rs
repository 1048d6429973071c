//! Screener orchestrator
//!
//! Runs the pattern scorer and potential-return projector across a symbol
//! universe, with bounded-concurrency fetches, per-symbol skip-on-failure,
//! and stable final ranking.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::{mean, potential::potential_return, score_windows, PatternScorer};
use crate::types::{
    Bar, PriceHistoryProvider, Result, ScoredStock, ScreenerError, ScreenerReport, TickerInfo,
};

/// Minimum bars required before a symbol is scored at all
const MIN_HISTORY_BARS: usize = 60;

/// Tunables for one screener run
#[derive(Debug, Clone)]
pub struct ScreenerConfig {
    /// Symbols scoring below this are dropped from the result
    pub min_final_score: f64,
    /// Result list is truncated to this many entries before ranking
    pub top_n: usize,
    /// Concurrent provider fetch cap
    pub max_concurrent_fetches: usize,
    /// Per-fetch timeout; a hang becomes a skip
    pub fetch_timeout: Duration,
    /// Provider lookback range and granularity
    pub history_range: String,
    pub history_interval: String,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            min_final_score: 20.0,
            top_n: 50,
            max_concurrent_fetches: 10,
            fetch_timeout: Duration::from_secs(10),
            history_range: "1y".to_string(),
            history_interval: "1d".to_string(),
        }
    }
}

/// Momentum screener over an explicit symbol universe
pub struct Screener {
    provider: Arc<dyn PriceHistoryProvider>,
    scorer: Arc<dyn PatternScorer>,
    config: ScreenerConfig,
}

impl Screener {
    pub fn new(provider: Arc<dyn PriceHistoryProvider>, scorer: Arc<dyn PatternScorer>) -> Self {
        Self {
            provider,
            scorer,
            config: ScreenerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScreenerConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the screener across a universe of symbols
    ///
    /// Per-symbol fetch errors, timeouts and short histories are skipped
    /// silently; an empty universe is a systemic error. Results are ranked
    /// by final score descending with encounter order breaking ties.
    pub async fn run(&self, universe: &[TickerInfo]) -> Result<ScreenerReport> {
        if universe.is_empty() {
            return Err(ScreenerError::SystemicFailure(
                "symbol universe is empty".to_string(),
            ));
        }

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_fetches));
        let futures = universe
            .iter()
            .map(|ticker| self.analyze_symbol(ticker, Arc::clone(&semaphore)));

        // join_all yields results in submission order, which keeps the
        // stable sort's tie-breaking independent of fetch completion order
        let results = join_all(futures).await;

        let mut stocks: Vec<ScoredStock> = results.into_iter().flatten().collect();
        stocks.retain(|s| s.final_score >= self.config.min_final_score);
        stocks.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        stocks.truncate(self.config.top_n);
        for (i, stock) in stocks.iter_mut().enumerate() {
            stock.rank = i + 1;
        }

        Ok(ScreenerReport {
            count: stocks.len(),
            analyzed: universe.len(),
            timestamp: Utc::now(),
            stocks,
        })
    }

    /// Fetch and score one symbol; any failure is a skip, never an abort
    async fn analyze_symbol(
        &self,
        ticker: &TickerInfo,
        semaphore: Arc<Semaphore>,
    ) -> Option<ScoredStock> {
        let _permit = semaphore.acquire().await.ok()?;

        let fetch = self.provider.fetch_history(
            &ticker.symbol,
            &self.config.history_range,
            &self.config.history_interval,
        );
        let bars = match tokio::time::timeout(self.config.fetch_timeout, fetch).await {
            Ok(Ok(bars)) => bars,
            Ok(Err(e)) => {
                warn!("Skipping {}: {}", ticker.symbol, e);
                return None;
            }
            Err(_) => {
                warn!(
                    "Skipping {}: fetch timed out after {:?}",
                    ticker.symbol, self.config.fetch_timeout
                );
                return None;
            }
        };

        self.score_symbol(ticker, &bars)
    }

    fn score_symbol(&self, ticker: &TickerInfo, bars: &[Bar]) -> Option<ScoredStock> {
        let closes: Vec<f64> = bars
            .iter()
            .filter_map(|b| b.close.to_f64())
            .filter(|c| c.is_finite() && *c > 0.0)
            .collect();

        if closes.len() < MIN_HISTORY_BARS {
            debug!(
                "Skipping {}: insufficient history ({} bars)",
                ticker.symbol,
                closes.len()
            );
            return None;
        }

        let timeframe_scores = score_windows(self.scorer.as_ref(), &closes);
        let window_values: Vec<f64> = timeframe_scores.values().copied().collect();
        let avg_pattern = mean(&window_values);
        let potential = potential_return(&closes, avg_pattern);
        let final_score = avg_pattern * 0.3 + potential * 0.7;

        let current_price = bars.last()?.close;
        let current = closes.last().copied()?;
        let projected_price = Decimal::try_from(current * (1.0 + potential / 100.0))
            .unwrap_or_default()
            .round_dp(2);

        Some(ScoredStock {
            symbol: ticker.symbol.clone(),
            name: ticker.name.clone(),
            exchange: ticker.exchange.clone(),
            current_price: current_price.round_dp(2),
            pattern_score: round1(avg_pattern),
            potential_return: round1(potential),
            final_score: round2(final_score),
            rank: 0,
            timeframe_scores: timeframe_scores
                .into_iter()
                .map(|(k, v)| (k, round1(v)))
                .collect(),
            projected_price,
        })
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round1(12.34), 12.3);
        assert_eq!(round2(12.345), 12.35);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_default_config_matches_documented_values() {
        let config = ScreenerConfig::default();
        assert_eq!(config.min_final_score, 20.0);
        assert_eq!(config.top_n, 50);
        assert_eq!(config.max_concurrent_fetches, 10);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
    }
}
