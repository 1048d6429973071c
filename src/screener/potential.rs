//! Potential-return projector
//!
//! Projects a 6-month forward gain percentage from trailing momentum. The
//! projection is gated on pattern quality: only symbols with an average
//! pattern score above 60 and positive average monthly gain get a non-zero
//! projection.

use super::mean;

const TRADING_DAYS_PER_MONTH: usize = 21;
const PROJECTION_MONTHS: f64 = 6.0;

/// Project a 6-month forward percentage gain, clamped to [0, 500]
///
/// Fewer than 60 closes always returns 0.
pub fn potential_return(closes: &[f64], avg_pattern_score: f64) -> f64 {
    if closes.len() < 60 {
        return 0.0;
    }
    let current = match closes.last() {
        Some(&c) if c.is_finite() && c > 0.0 => c,
        _ => return 0.0,
    };

    // Monthly-normalized gains at 1..6 month lookbacks: gain% / months_back
    let mut monthly_gains = Vec::new();
    for months_back in 1..=6usize {
        let days = months_back * TRADING_DAYS_PER_MONTH;
        if closes.len() > days {
            let past = closes[closes.len() - 1 - days];
            if past > 0.0 {
                let gain = (current - past) / past * 100.0;
                monthly_gains.push(gain / months_back as f64);
            }
        }
    }
    if monthly_gains.is_empty() {
        return 0.0;
    }
    let avg_monthly_gain = mean(&monthly_gains);

    // Pattern-quality gate: no projection without a strong, growing pattern
    if avg_pattern_score <= 60.0 || avg_monthly_gain <= 0.0 {
        return 0.0;
    }

    let mut potential = avg_monthly_gain * PROJECTION_MONTHS;

    // Acceleration bonus when the trailing 3-month gain outruns the average
    let three_months = 3 * TRADING_DAYS_PER_MONTH;
    if closes.len() > three_months {
        let past = closes[closes.len() - 1 - three_months];
        if past > 0.0 {
            let gain_3m = (current - past) / past * 100.0;
            if gain_3m > avg_monthly_gain {
                potential *= 1.2;
            }
        }
    }

    // Early-stage multiplier from distance above the trailing low:
    // trends still near their low have the most room left
    let trailing_low = closes
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::INFINITY, f64::min);
    if trailing_low > 0.0 && trailing_low.is_finite() {
        let distance_from_low = (current - trailing_low) / trailing_low * 100.0;
        potential *= if distance_from_low < 200.0 {
            1.5
        } else if distance_from_low < 400.0 {
            1.2
        } else {
            0.8
        };
    }

    potential.clamp(0.0, 500.0)
}
