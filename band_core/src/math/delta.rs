use serde::Serialize;

use crate::common::{band_error::BandError, enums::Horizon};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceDelta {
    pub horizon: Horizon,
    pub horizon_label: String,
    pub absolute_diff: f64,
    pub percentage_diff: f64,
}

impl PriceDelta {
    fn between(horizon: Horizon, latest: f64, past: f64) -> Self {
        let absolute_diff = latest - past;
        Self {
            horizon,
            horizon_label: horizon.to_string(),
            absolute_diff,
            percentage_diff: absolute_diff / past * 100.0,
        }
    }
}

/// Compare the latest close with the close `offset` bars earlier for each
/// horizon. Fails on the first horizon the series is too short for.
pub fn calculate_price_differences(
    closes: &[f64],
    horizons: &[Horizon],
) -> Result<Vec<PriceDelta>, BandError> {
    let len = closes.len();
    horizons
        .iter()
        .map(|&horizon| {
            delta_for(closes, horizon).ok_or_else(|| BandError::InsufficientHistory {
                horizon,
                required: horizon.required_bars(),
                available: len,
                satisfiable: longest_satisfiable(len, horizons),
            })
        })
        .collect()
}

/// Like [`calculate_price_differences`] but silently drops horizons that
/// reach past the start of the series.
pub fn calculate_available_deltas(closes: &[f64], horizons: &[Horizon]) -> Vec<PriceDelta> {
    horizons
        .iter()
        .filter_map(|&horizon| delta_for(closes, horizon))
        .collect()
}

/// Longest of `horizons` a series of `len` bars can serve.
pub fn longest_satisfiable(len: usize, horizons: &[Horizon]) -> Option<Horizon> {
    horizons
        .iter()
        .filter(|h| h.required_bars() <= len)
        .max_by_key(|h| h.offset())
        .copied()
}

fn delta_for(closes: &[f64], horizon: Horizon) -> Option<PriceDelta> {
    let len = closes.len();
    if len < horizon.required_bars() {
        return None;
    }
    let latest = closes[len - 1];
    let past = closes[len - 1 - horizon.offset()];
    Some(PriceDelta::between(horizon, latest, past))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn all_horizons() -> Vec<Horizon> {
        Horizon::iter().collect()
    }

    #[test]
    fn test_five_deltas_with_full_history() {
        let closes: Vec<f64> = (0..132).map(|i| 50.0 + ((i * 7) % 13) as f64).collect();
        let deltas = calculate_price_differences(&closes, &all_horizons()).unwrap();
        assert_eq!(deltas.len(), 5);
        for d in &deltas {
            assert_eq!(d.absolute_diff > 0.0, d.percentage_diff > 0.0);
            assert_eq!(d.absolute_diff < 0.0, d.percentage_diff < 0.0);
        }
        assert_eq!(deltas[4].horizon_label, "6 Months");
        assert_eq!(deltas[4].absolute_diff, closes[131] - closes[0]);
    }

    #[test]
    fn test_daily_delta_values() {
        let closes = [100.0, 95.0, 110.0];
        let deltas = calculate_price_differences(&closes, &[Horizon::Daily]).unwrap();
        assert_eq!(deltas[0].absolute_diff, 15.0);
        assert!((deltas[0].percentage_diff - 15.0 / 95.0 * 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_90_day_horizon_indices() {
        let closes: Vec<f64> = (0..200).map(|i| i as f64 + 1.0).collect();
        let deltas = calculate_price_differences(&closes, &[Horizon::Days90]).unwrap();
        // index 199 against index 110
        assert_eq!(deltas[0].absolute_diff, closes[199] - closes[110]);
        assert_eq!(deltas[0].absolute_diff, 89.0);
    }

    #[test]
    fn test_insufficient_history() {
        let closes: Vec<f64> = (0..100).map(|i| i as f64 + 1.0).collect();
        let err = calculate_price_differences(&closes, &all_horizons()).unwrap_err();
        assert_eq!(
            err,
            BandError::InsufficientHistory {
                horizon: Horizon::SixMonths,
                required: 132,
                available: 100,
                satisfiable: Some(Horizon::Days90),
            }
        );

        let err = calculate_price_differences(&[1.0], &[Horizon::Daily]).unwrap_err();
        assert!(matches!(err, BandError::InsufficientHistory { satisfiable: None, .. }));
    }

    #[test]
    fn test_available_deltas_degrade() {
        let closes: Vec<f64> = (0..22).map(|i| i as f64 + 1.0).collect();
        let deltas = calculate_available_deltas(&closes, &all_horizons());
        let got: Vec<Horizon> = deltas.iter().map(|d| d.horizon).collect();
        assert_eq!(got, vec![Horizon::Daily, Horizon::Weekly, Horizon::Monthly]);
        assert!(calculate_available_deltas(&[], &all_horizons()).is_empty());
    }
}
