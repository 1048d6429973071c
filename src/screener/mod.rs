//! Momentum screener - exponential pattern scoring and ranking
//!
//! Two interchangeable pattern scorers (numerical curve fit and a
//! dependency-free stride heuristic) behind one trait, a potential-return
//! projector, and the orchestrator that runs them across a symbol universe.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::types::TimeframeWindow;

pub mod curve_fit;
pub mod orchestrator;
pub mod potential;
pub mod stride;

pub use curve_fit::CurveFitScorer;
pub use orchestrator::{Screener, ScreenerConfig};
pub use stride::StrideScorer;

/// Pattern scoring strategy - all variants implement this
///
/// Input is a chronological slice of positive closes; output is a score in
/// [0, 100] rewarding sustained, accelerating, positive growth. Fewer than
/// 10 points always scores 0, never errors.
pub trait PatternScorer: Send + Sync {
    /// Strategy name (for config/display)
    fn name(&self) -> &'static str;

    /// Score a single lookback window of closes
    fn score(&self, closes: &[f64]) -> f64;
}

/// Create a scorer by configured strategy name, defaulting to curve fit
pub fn scorer_for(strategy: &str) -> Arc<dyn PatternScorer> {
    match strategy {
        "stride" => Arc::new(StrideScorer::default()),
        _ => Arc::new(CurveFitScorer::default()),
    }
}

/// Score every qualifying timeframe window of a close series
///
/// A window qualifies only when the series covers its full length; the
/// returned map is keyed by window name ("1M".."1Y").
pub fn score_windows(scorer: &dyn PatternScorer, closes: &[f64]) -> BTreeMap<String, f64> {
    let mut scores = BTreeMap::new();
    for window in TimeframeWindow::ALL {
        let days = window.trading_days();
        if closes.len() >= days {
            let slice = &closes[closes.len() - days..];
            scores.insert(window.as_str().to_string(), scorer.score(slice));
        }
    }
    scores
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Ordinary least-squares line over y at x = 0..n-1, returns (slope, intercept)
pub(crate) fn linear_fit(y: &[f64]) -> (f64, f64) {
    let n = y.len() as f64;
    if y.len() < 2 {
        return (0.0, y.first().copied().unwrap_or(0.0));
    }
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(y);

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &yi) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (yi - y_mean);
        den += dx * dx;
    }

    if den.abs() < f64::EPSILON {
        return (0.0, y_mean);
    }
    let slope = num / den;
    (slope, y_mean - slope * x_mean)
}

/// Coefficient of determination of `fitted` against `y`
///
/// Returns 0 for a degenerate (zero-variance) series; can go negative for
/// fits worse than the mean.
pub(crate) fn r_squared(y: &[f64], fitted: &[f64]) -> f64 {
    let y_mean = mean(y);
    let ss_tot: f64 = y.iter().map(|&v| (v - y_mean).powi(2)).sum();
    if ss_tot <= 0.0 {
        return 0.0;
    }
    let ss_res: f64 = y
        .iter()
        .zip(fitted)
        .map(|(&yi, &fi)| (yi - fi).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}
