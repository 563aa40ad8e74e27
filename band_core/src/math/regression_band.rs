use log::{debug, warn};
use serde::Serialize;

use super::{polyfit::polyfit, stats::population_std};
use crate::common::{
    band_error::BandError,
    enums::{BandColor, DegreeRounding},
};

pub const MIN_DEGREE: u32 = 1;
pub const MAX_DEGREE: u32 = 200;

/// Display metadata per tier: (color, upper label, lower label).
const TIER_TABLE: [(BandColor, &str, &str); 4] = [
    (BandColor::Green, "Take Profit Level 1", "DCA Buy Level 1"),
    (BandColor::Blue, "Take Profit Level 2", "DCA Buy Level 2"),
    (BandColor::Red, "Take Profit Level 3", "DCA Buy Level 3"),
    (BandColor::Purple, "Take Profit Level 4", "DCA Buy Level 4"),
];

pub const MAX_BANDS: usize = TIER_TABLE.len();

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionResult {
    pub fitted_values: Vec<f64>,
    pub residual_std: f64,
    /// `sqrt(degree_input)` before rounding.
    pub degree_used: f64,
    /// Integer order actually fitted.
    pub fit_order: usize,
    /// Ascending powers of the normalised position `i / (L - 1)`.
    pub coefficients: Vec<f64>,
}

/// Where a renderer should place a band's labels, `x_offset` positions past
/// the last bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandAnnotation {
    pub x_offset: f64,
    pub upper_y: f64,
    pub lower_y: f64,
    pub upper_text: String,
    pub lower_text: String,
    pub upper_color: BandColor,
    pub lower_color: BandColor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub tier: u8,
    pub lower_curve: Vec<f64>,
    pub upper_curve: Vec<f64>,
    pub color: BandColor,
    pub upper_label: String,
    pub lower_label: String,
    pub annotation: BandAnnotation,
}

impl Band {
    pub fn width(&self, index: usize) -> f64 {
        self.upper_curve[index] - self.lower_curve[index]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitterConfig {
    pub num_bands: usize,
    pub rounding: DegreeRounding,
    pub annotation_offset_ratio: f64,
}

impl Default for FitterConfig {
    fn default() -> Self {
        Self {
            num_bands: MAX_BANDS,
            rounding: DegreeRounding::Round,
            annotation_offset_ratio: 0.2,
        }
    }
}

/// Fits a polynomial trend over the normalised position axis and derives
/// `num_bands` deviation bands around it.
#[derive(Debug, Clone, Default)]
pub struct RegressionBandFitter {
    config: FitterConfig,
}

impl RegressionBandFitter {
    pub fn new(config: FitterConfig) -> Result<Self, BandError> {
        if config.num_bands == 0 || config.num_bands > MAX_BANDS {
            return Err(BandError::InvalidParameter(format!(
                "num_bands={} must be in [1, {}]",
                config.num_bands, MAX_BANDS
            )));
        }
        if !config.annotation_offset_ratio.is_finite() || config.annotation_offset_ratio < 0.0 {
            return Err(BandError::InvalidParameter(format!(
                "annotation_offset_ratio={} must be a non-negative number",
                config.annotation_offset_ratio
            )));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &FitterConfig {
        &self.config
    }

    pub fn fit(&self, closes: &[f64], degree_input: u32) -> Result<(RegressionResult, Vec<Band>), BandError> {
        let len = closes.len();
        if len < 2 {
            return Err(BandError::InsufficientData {
                required: 2,
                available: len,
            });
        }
        if !(MIN_DEGREE..=MAX_DEGREE).contains(&degree_input) {
            return Err(BandError::InvalidParameter(format!(
                "degree={} must be in [{}, {}]",
                degree_input, MIN_DEGREE, MAX_DEGREE
            )));
        }
        if let Some(pos) = closes.iter().position(|c| !c.is_finite()) {
            return Err(BandError::InvalidParameter(format!(
                "close at index {} is not finite",
                pos
            )));
        }

        let regression = self.fit_curve(closes, degree_input)?;
        let bands = self.derive_bands(&regression, len);
        Ok((regression, bands))
    }

    fn fit_curve(&self, closes: &[f64], degree_input: u32) -> Result<RegressionResult, BandError> {
        let len = closes.len();
        let last = (len - 1) as f64;
        let x: Vec<f64> = (0..len).map(|i| i as f64 / last).collect();

        let degree_used = (degree_input as f64).sqrt();
        let wanted = (self.config.rounding.apply(degree_used) as usize).max(1);
        let fit_order = wanted.min(len - 1);
        if fit_order < wanted {
            warn!(
                "order {} clamped to {} for a series of {} closes",
                wanted, fit_order, len
            );
        }
        debug!(
            "fitting order {} (degree {} -> {:.4}, {}) over {} closes",
            fit_order, degree_input, degree_used, self.config.rounding, len
        );

        let polynomial = polyfit(&x, closes, fit_order)?;
        let fitted_values: Vec<f64> = x.iter().map(|&xi| polynomial.eval(xi)).collect();

        let residuals: Vec<f64> = closes
            .iter()
            .zip(&fitted_values)
            .map(|(c, f)| c - f)
            .collect();
        let residual_std = population_std(&residuals).unwrap_or(0.0);

        Ok(RegressionResult {
            fitted_values,
            residual_std,
            degree_used,
            fit_order,
            coefficients: polynomial.coefficients,
        })
    }

    fn derive_bands(&self, regression: &RegressionResult, len: usize) -> Vec<Band> {
        let x_offset = self.config.annotation_offset_ratio * len as f64;

        TIER_TABLE
            .iter()
            .take(self.config.num_bands)
            .enumerate()
            .map(|(idx, &(color, upper_text, lower_text))| {
                let tier = idx + 1;
                let spread = tier as f64 * regression.residual_std;
                let lower_curve: Vec<f64> = regression.fitted_values.iter().map(|v| v - spread).collect();
                let upper_curve: Vec<f64> = regression.fitted_values.iter().map(|v| v + spread).collect();

                let annotation = BandAnnotation {
                    x_offset,
                    upper_y: upper_curve[len - 1],
                    lower_y: lower_curve[len - 1],
                    upper_text: upper_text.to_string(),
                    lower_text: lower_text.to_string(),
                    upper_color: color,
                    lower_color: color,
                };

                Band {
                    tier: tier as u8,
                    lower_curve,
                    upper_curve,
                    color,
                    upper_label: upper_text.to_string(),
                    lower_label: lower_text.to_string(),
                    annotation,
                }
            })
            .collect()
    }
}

/// Fit with the default four bands, rounding and label offset.
pub fn fit_regression_bands(closes: &[f64], degree_input: u32) -> Result<(RegressionResult, Vec<Band>), BandError> {
    RegressionBandFitter::default().fit(closes, degree_input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wavy(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let t = i as f64;
                100.0 + 0.3 * t + 8.0 * (t / 9.0).sin() + 3.0 * (t / 2.3).cos()
            })
            .collect()
    }

    #[test]
    fn test_five_point_linear_scenario() {
        let closes = [10.0, 12.0, 11.0, 13.0, 15.0];
        let (reg, bands) = fit_regression_bands(&closes, 1).unwrap();

        assert_eq!(reg.fit_order, 1);
        assert_eq!(reg.degree_used, 1.0);
        let expected = [10.0, 11.1, 12.2, 13.3, 14.4];
        for (got, want) in reg.fitted_values.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{} vs {}", got, want);
        }
        assert!((reg.residual_std - 0.54f64.sqrt()).abs() < 1e-9);

        assert_eq!(bands.len(), 4);
        assert_eq!(bands[0].tier, 1);
        assert!(bands[0].width(2) < bands[1].width(2));
    }

    #[test]
    fn test_band_invariants() {
        let closes = wavy(300);
        for degree in [1, 4, 12, 50, 200] {
            let (reg, bands) = fit_regression_bands(&closes, degree).unwrap();
            assert_eq!(reg.fitted_values.len(), closes.len());
            assert!(reg.residual_std > 0.0);
            for band in &bands {
                assert_eq!(band.lower_curve.len(), closes.len());
                for i in 0..closes.len() {
                    assert!(band.lower_curve[i] <= reg.fitted_values[i]);
                    assert!(reg.fitted_values[i] <= band.upper_curve[i]);
                }
            }
            for pair in bands.windows(2) {
                for i in 0..closes.len() {
                    assert!(pair[0].width(i) < pair[1].width(i));
                }
            }
        }
    }

    #[test]
    fn test_tier_metadata() {
        let (_, bands) = fit_regression_bands(&wavy(50), 12).unwrap();
        let colors: Vec<BandColor> = bands.iter().map(|b| b.color).collect();
        assert_eq!(
            colors,
            vec![BandColor::Green, BandColor::Blue, BandColor::Red, BandColor::Purple]
        );
        assert_eq!(bands[2].upper_label, "Take Profit Level 3");
        assert_eq!(bands[2].lower_label, "DCA Buy Level 3");
        assert_eq!(bands[2].annotation.upper_color, BandColor::Red);
        assert_eq!(bands[2].annotation.lower_color, BandColor::Red);
        assert!((bands[0].annotation.x_offset - 10.0).abs() < 1e-12);
        assert_eq!(bands[3].annotation.upper_y, *bands[3].upper_curve.last().unwrap());
    }

    #[test]
    fn test_deterministic() {
        let closes = wavy(120);
        let (a, _) = fit_regression_bands(&closes, 37).unwrap();
        let (b, _) = fit_regression_bands(&closes, 37).unwrap();
        let bits_a: Vec<u64> = a.fitted_values.iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u64> = b.fitted_values.iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn test_exact_fit_has_zero_dispersion() {
        let constant = [42.0; 30];
        let (reg, bands) = fit_regression_bands(&constant, 9).unwrap();
        assert!(reg.residual_std < 1e-9);
        assert!(bands[3].width(0) < 1e-8);

        let line: Vec<f64> = (0..20).map(|i| 5.0 + 2.0 * i as f64).collect();
        let (reg, _) = fit_regression_bands(&line, 1).unwrap();
        assert!(reg.residual_std < 1e-9);
    }

    #[test]
    fn test_order_rounding_and_clamp() {
        let closes = wavy(100);
        let (reg, _) = fit_regression_bands(&closes, 12).unwrap();
        assert_eq!(reg.fit_order, 3);
        assert!((reg.degree_used - 12f64.sqrt()).abs() < 1e-15);

        let ceil = RegressionBandFitter::new(FitterConfig {
            rounding: DegreeRounding::Ceil,
            ..FitterConfig::default()
        })
        .unwrap();
        let (reg, _) = ceil.fit(&closes, 12).unwrap();
        assert_eq!(reg.fit_order, 4);

        // Two points can only carry a line.
        let (reg, bands) = fit_regression_bands(&[3.0, 7.0], 200).unwrap();
        assert_eq!(reg.fit_order, 1);
        assert!(reg.residual_std < 1e-12);
        assert_eq!(bands.len(), 4);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            fit_regression_bands(&[1.0], 4),
            Err(BandError::InsufficientData { available: 1, .. })
        ));
        assert!(matches!(
            fit_regression_bands(&[], 4),
            Err(BandError::InsufficientData { available: 0, .. })
        ));
        assert!(matches!(
            fit_regression_bands(&[1.0, 2.0, 3.0], 0),
            Err(BandError::InvalidParameter(_))
        ));
        assert!(matches!(
            fit_regression_bands(&[1.0, 2.0, 3.0], 201),
            Err(BandError::InvalidParameter(_))
        ));
        assert!(matches!(
            fit_regression_bands(&[1.0, f64::NAN, 3.0], 4),
            Err(BandError::InvalidParameter(_))
        ));
        assert!(RegressionBandFitter::new(FitterConfig {
            num_bands: 5,
            ..FitterConfig::default()
        })
        .is_err());
    }

    #[test]
    fn test_fewer_bands() {
        let fitter = RegressionBandFitter::new(FitterConfig {
            num_bands: 2,
            ..FitterConfig::default()
        })
        .unwrap();
        let (_, bands) = fitter.fit(&wavy(40), 4).unwrap();
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[1].color, BandColor::Blue);
    }
}
