//! Performance metrics — pure functions over the recorded NAV history.
//!
//! NAV series in, scalar out. No dependencies on the runner, batcher, or
//! engine, so every function is trivially testable in isolation.

/// Per-step percentage changes of a series, dropping the undefined first value.
pub fn pct_changes(series: &[f64]) -> Vec<f64> {
    series
        .windows(2)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .collect()
}

/// Arithmetic mean. 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1, the pandas default the remote
/// evaluator uses). 0.0 when fewer than two values make it undefined.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Annualized Sharpe ratio of a NAV history, assuming a zero risk-free rate.
///
/// `sharpe = mean(returns) * ppy / (stdev(returns) * sqrt(ppy))` over the
/// per-step percentage returns. Degenerate inputs — fewer than 2 NAV samples,
/// an empty or single-element return series, zero standard deviation, or any
/// non-finite intermediate (e.g. a zero NAV sample) — yield 0.0, so the
/// result is always finite.
pub fn sharpe_ratio(nav_history: &[f64], periods_per_year: u32) -> f64 {
    if nav_history.len() < 2 {
        return 0.0;
    }
    let returns = pct_changes(nav_history);
    let std = std_dev(&returns);
    if std == 0.0 {
        return 0.0;
    }

    let ppy = periods_per_year as f64;
    let sharpe = (mean(&returns) * ppy) / (std * ppy.sqrt());
    if sharpe.is_finite() {
        sharpe
    } else {
        0.0
    }
}
