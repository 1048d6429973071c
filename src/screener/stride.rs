//! Dependency-free pattern scorer
//!
//! Degraded-mode fallback for hosts where the numerical fit is unwanted:
//! approximates "accelerating growth" with stride gains, an early/late
//! acceleration split, gain consistency and a short-term slope term.

use super::{mean, PatternScorer};

/// Scores growth shape from non-overlapping stride gains
///
/// Score = 0.4 * consistency + 0.3 * clamped acceleration + 0.3 * slope,
/// all components in [0, 100], final score clamped to [0, 100].
#[derive(Debug, Clone)]
pub struct StrideScorer {
    stride: usize,
}

impl Default for StrideScorer {
    fn default() -> Self {
        Self { stride: 5 }
    }
}

impl StrideScorer {
    /// Percentage gains over consecutive non-overlapping strides
    fn stride_gains(&self, closes: &[f64]) -> Vec<f64> {
        let mut gains = Vec::new();
        let mut i = self.stride;
        while i < closes.len() {
            let prev = closes[i - self.stride];
            if prev > 0.0 {
                gains.push((closes[i] - prev) / prev * 100.0);
            }
            i += self.stride;
        }
        gains
    }
}

impl PatternScorer for StrideScorer {
    fn name(&self) -> &'static str {
        "stride"
    }

    fn score(&self, closes: &[f64]) -> f64 {
        let y: Vec<f64> = closes.iter().copied().filter(|v| v.is_finite()).collect();
        if y.len() < 10 {
            return 0.0;
        }

        let gains = self.stride_gains(&y);
        if gains.len() < 2 {
            return 0.0;
        }

        // Early vs late halves: positive difference means gains are speeding up
        let mid = gains.len() / 2;
        let acceleration = mean(&gains[mid..]) - mean(&gains[..mid]);

        let positive = gains.iter().filter(|&&g| g > 0.0).count();
        let consistency = positive as f64 / gains.len() as f64 * 100.0;

        let tail = &y[y.len().saturating_sub(20)..];
        let slope_score = match (tail.first(), tail.last()) {
            (Some(&first), Some(&last)) => (10.0 * (last - first) / 20.0).clamp(0.0, 100.0),
            _ => 0.0,
        };

        let score = 0.4 * consistency
            + 0.3 * (5.0 * acceleration).clamp(0.0, 100.0)
            + 0.3 * slope_score;

        score.clamp(0.0, 100.0)
    }
}
