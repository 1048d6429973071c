//! Curve-fit pattern scorer
//!
//! Fits `y = a * e^(b*x)` by nonlinear least squares and scores how much
//! better the exponential explains the series than a straight line. This is
//! the mathematically principled variant; `StrideScorer` is the degraded-mode
//! fallback with the same contract.

use super::{linear_fit, mean, r_squared, PatternScorer};

/// Scores exponential-growth shape via nonlinear least squares
///
/// Scoring: up to 70 points for exponential fit quality (R^2 * 70 when
/// R^2 > 0.7 and the fit is growing), plus a 30-point bonus when the
/// exponential explains the data better than a line and b > 0. Decaying
/// fits earn nothing; any numerical failure scores 0.
#[derive(Debug, Clone)]
pub struct CurveFitScorer {
    max_iterations: usize,
    tolerance: f64,
}

impl Default for CurveFitScorer {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-9,
        }
    }
}

impl CurveFitScorer {
    /// Fit `y = a * e^(b*x)` over x = 0..n-1
    ///
    /// Seeds from a log-linear regression, then refines with Gauss-Newton
    /// iterations solving the 2x2 normal equations in closed form. Returns
    /// None when the fit diverges or produces non-finite parameters.
    fn fit_exponential(&self, y: &[f64]) -> Option<(f64, f64)> {
        // Log-linear seed requires strictly positive values
        let logs: Vec<f64> = y.iter().map(|&v| v.ln()).collect();
        if logs.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let (b_seed, ln_a_seed) = linear_fit(&logs);
        let mut a = ln_a_seed.exp();
        let mut b = b_seed;
        if !a.is_finite() || !b.is_finite() {
            return None;
        }

        for _ in 0..self.max_iterations {
            // Jacobian columns: df/da = e^(bx), df/db = a*x*e^(bx)
            let mut jtj = [[0.0f64; 2]; 2];
            let mut jtr = [0.0f64; 2];
            for (i, &yi) in y.iter().enumerate() {
                let x = i as f64;
                let e = (b * x).exp();
                if !e.is_finite() {
                    return None;
                }
                let residual = yi - a * e;
                let ja = e;
                let jb = a * x * e;
                jtj[0][0] += ja * ja;
                jtj[0][1] += ja * jb;
                jtj[1][1] += jb * jb;
                jtr[0] += ja * residual;
                jtr[1] += jb * residual;
            }
            jtj[1][0] = jtj[0][1];

            let det = jtj[0][0] * jtj[1][1] - jtj[0][1] * jtj[1][0];
            if det.abs() < f64::EPSILON {
                break;
            }
            let da = (jtr[0] * jtj[1][1] - jtr[1] * jtj[0][1]) / det;
            let db = (jtr[1] * jtj[0][0] - jtr[0] * jtj[1][0]) / det;
            a += da;
            b += db;
            if !a.is_finite() || !b.is_finite() {
                return None;
            }
            if da.abs() < self.tolerance && db.abs() < self.tolerance {
                break;
            }
        }

        Some((a, b))
    }
}

impl PatternScorer for CurveFitScorer {
    fn name(&self) -> &'static str {
        "curve_fit"
    }

    fn score(&self, closes: &[f64]) -> f64 {
        let y: Vec<f64> = closes.iter().copied().filter(|v| v.is_finite()).collect();
        if y.len() < 10 {
            return 0.0;
        }
        if y.iter().any(|&v| v <= 0.0) {
            return 0.0;
        }

        let y_mean = mean(&y);
        let ss_tot: f64 = y.iter().map(|&v| (v - y_mean).powi(2)).sum();
        if ss_tot <= 0.0 {
            // Flat series carries no growth pattern
            return 0.0;
        }

        let Some((a, b)) = self.fit_exponential(&y) else {
            return 0.0;
        };

        let exp_fitted: Vec<f64> = (0..y.len()).map(|i| a * (b * i as f64).exp()).collect();
        if exp_fitted.iter().any(|v| !v.is_finite()) {
            return 0.0;
        }
        let r2_exp = r_squared(&y, &exp_fitted);

        let (slope, intercept) = linear_fit(&y);
        let lin_fitted: Vec<f64> = (0..y.len())
            .map(|i| slope * i as f64 + intercept)
            .collect();
        let r2_lin = r_squared(&y, &lin_fitted);

        let mut score = 0.0;
        // Fit quality only counts for growing fits; a clean decay also has
        // high R^2 but earns no positive-growth credit
        if r2_exp > 0.7 && b > 0.0 {
            score += r2_exp * 70.0;
        }
        if r2_exp > r2_lin && b > 0.0 {
            score += 30.0;
        }

        score.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exponential_series(n: usize, rate: f64) -> Vec<f64> {
        (0..n).map(|i| 100.0 * (1.0 + rate).powi(i as i32)).collect()
    }

    #[test]
    fn test_short_series_scores_zero() {
        let scorer = CurveFitScorer::default();
        assert_eq!(scorer.score(&[100.0; 9]), 0.0);
        assert_eq!(scorer.score(&[]), 0.0);
    }

    #[test]
    fn test_flat_series_scores_zero() {
        let scorer = CurveFitScorer::default();
        assert_eq!(scorer.score(&[100.0; 63]), 0.0);
    }

    #[test]
    fn test_decreasing_series_scores_zero() {
        let scorer = CurveFitScorer::default();
        let falling: Vec<f64> = (0..63).map(|i| 100.0 - i as f64).collect();
        assert_eq!(scorer.score(&falling), 0.0);

        // Clean exponential decay fits well but is not growth
        let decaying = exponential_series(63, -0.02);
        assert_eq!(scorer.score(&decaying), 0.0);
    }

    #[test]
    fn test_clean_exponential_scores_high() {
        let scorer = CurveFitScorer::default();
        let score = scorer.score(&exponential_series(126, 0.05));
        assert!(score > 70.0, "clean exponential scored {}", score);
        assert!(score <= 100.0);
    }

    #[test]
    fn test_exponential_beats_linear_of_equal_gain() {
        let scorer = CurveFitScorer::default();
        let n = 126;
        let exp = exponential_series(n, 0.02);
        let net = exp.last().unwrap() - exp.first().unwrap();
        let lin: Vec<f64> = (0..n)
            .map(|i| 100.0 + net * i as f64 / (n - 1) as f64)
            .collect();
        assert!(scorer.score(&exp) > scorer.score(&lin));
    }

    #[test]
    fn test_adversarial_inputs_stay_in_range() {
        let scorer = CurveFitScorer::default();
        let mut spike = vec![100.0; 63];
        spike[62] = 10_000.0;
        for series in [
            spike,
            vec![1e-12; 30],
            (0..30).map(|i| 100.0 + (i % 2) as f64 * 50.0).collect(),
        ] {
            let score = scorer.score(&series);
            assert!((0.0..=100.0).contains(&score), "score {} out of range", score);
        }
    }

    #[test]
    fn test_non_finite_values_filtered() {
        let scorer = CurveFitScorer::default();
        let mut series = exponential_series(63, 0.03);
        series[10] = f64::NAN;
        series[40] = f64::INFINITY;
        let score = scorer.score(&series);
        assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn test_idempotent() {
        let scorer = CurveFitScorer::default();
        let series = exponential_series(252, 0.01);
        assert_eq!(scorer.score(&series), scorer.score(&series));
    }
}
