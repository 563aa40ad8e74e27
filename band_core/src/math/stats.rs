use serde::Serialize;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation normalised by `n`, not `n - 1`.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let mid = mean(values)?;
    let variance = values.iter().map(|&x| (x - mid).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Max of the trailing `window` values, `None` until the window is full.
pub fn rolling_max_last(values: &[f64], window: usize) -> Option<f64> {
    trailing_window(values, window).map(|w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// Min of the trailing `window` values, `None` until the window is full.
pub fn rolling_min_last(values: &[f64], window: usize) -> Option<f64> {
    trailing_window(values, window).map(|w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

fn trailing_window(values: &[f64], window: usize) -> Option<&[f64]> {
    if window == 0 || values.len() < window {
        return None;
    }
    Some(&values[values.len() - window..])
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSummary {
    pub latest_close: f64,
    pub window: usize,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

impl RangeSummary {
    pub fn new(closes: &[f64], window: usize) -> Option<Self> {
        let latest_close = *closes.last()?;
        Some(Self {
            latest_close,
            window,
            high: rolling_max_last(closes, window),
            low: rolling_min_last(closes, window),
        })
    }
}
