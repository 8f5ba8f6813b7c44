/// Sort-and-index percentile: `sorted[floor(n * fraction)]`, clamped to the last element.
///
/// Sorts `values` in place. Returns 0 for an empty slice.
pub fn percentile(values: &mut [f64], fraction: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(|a, b| a.total_cmp(b));
    value_at(values, fraction)
}

fn value_at(sorted: &[f64], fraction: f64) -> f64 {
    let n = sorted.len();
    let idx = ((n as f64) * fraction.clamp(0.0, 1.0)).floor() as usize;
    sorted[idx.min(n - 1)]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantiles {
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

/// p10/p50/p90 with a single sort.
pub fn quantiles(values: &mut [f64]) -> Quantiles {
    if values.is_empty() {
        return Quantiles {
            p10: 0.0,
            p50: 0.0,
            p90: 0.0,
        };
    }

    values.sort_by(|a, b| a.total_cmp(b));
    Quantiles {
        p10: value_at(values, 0.1),
        p50: value_at(values, 0.5),
        p90: value_at(values, 0.9),
    }
}

/// Per-period value buckets: `periods[i]` holds one value per simulated path.
pub struct PeriodAccumulator {
    periods: Vec<Vec<f64>>,
}

impl PeriodAccumulator {
    pub fn new(period_count: usize, expected_samples: usize) -> Self {
        Self {
            periods: (0..period_count)
                .map(|_| Vec::with_capacity(expected_samples))
                .collect(),
        }
    }

    pub fn push(&mut self, period: usize, value: f64) {
        self.periods[period].push(value);
    }

    pub fn into_quantiles(self) -> Vec<Quantiles> {
        self.periods
            .into_iter()
            .map(|mut values| quantiles(&mut values))
            .collect()
    }
}

/// Days sampled from a daily path of `horizon_days` steps: `step, 2*step, ...`.
///
/// Picks every `step`th day rather than averaging within the bucket.
pub fn downsample_days(horizon_days: u32, step: u32) -> Vec<u32> {
    if step == 0 {
        return Vec::new();
    }
    (1..=horizon_days / step).map(|k| k * step).collect()
}
