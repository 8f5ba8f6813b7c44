use tracing::debug;

/// Calendar days per year; the drift projection steps once per calendar day.
pub const DAYS_PER_YEAR: f64 = 365.0;

const DEFAULT_ANNUAL_RETURN: f64 = 0.12;
const DEFAULT_ANNUAL_VOLATILITY: f64 = 0.16;

/// Per-day log-return moments used to drive the drift projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftEstimate {
    pub mean: f64,
    pub std_dev: f64,
    pub from_history: bool,
}

impl DriftEstimate {
    pub fn fallback() -> Self {
        Self {
            mean: DEFAULT_ANNUAL_RETURN / DAYS_PER_YEAR,
            std_dev: DEFAULT_ANNUAL_VOLATILITY / DAYS_PER_YEAR.sqrt(),
            from_history: false,
        }
    }
}

/// Mean and sample standard deviation of `ln(v[i] / v[i-1])`.
///
/// Pairs with a non-positive or non-finite value are skipped. Fewer than two
/// usable returns yields [`DriftEstimate::fallback`].
pub fn estimate_drift(values: &[f64]) -> DriftEstimate {
    let returns: Vec<f64> = values
        .windows(2)
        .filter(|w| w[0].is_finite() && w[1].is_finite() && w[0] > 0.0 && w[1] > 0.0)
        .map(|w| (w[1] / w[0]).ln())
        .collect();

    if returns.len() < 2 {
        debug!(
            usable_returns = returns.len(),
            "insufficient history, using default drift"
        );
        return DriftEstimate::fallback();
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

    DriftEstimate {
        mean,
        std_dev: variance.sqrt(),
        from_history: true,
    }
}
