use log::{debug, info, warn};
use serde::Serialize;

use crate::common::{band_error::BandError, time::Time};
use crate::config::band_config::BandConfig;
use crate::kline::price_series::PriceSeries;
use crate::math::{
    delta::{calculate_available_deltas, PriceDelta},
    regression_band::{Band, RegressionBandFitter, RegressionResult},
    stats::RangeSummary,
};

/// Everything one analysis request produces for a series.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub bar_count: usize,
    pub first_time: Time,
    pub last_time: Time,
    pub summary: RangeSummary,
    pub deltas: Vec<PriceDelta>,
    pub regression: RegressionResult,
    pub bands: Vec<Band>,
    /// Calendar position of the band labels when bars are daily.
    pub annotation_time: Time,
}

/// 分析器，负责价格变化和回归带的计算
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: BandConfig,
    fitter: RegressionBandFitter,
}

impl Analyzer {
    pub fn new(config: BandConfig) -> Result<Self, BandError> {
        config.validate()?;
        let fitter = RegressionBandFitter::new(config.fitter_config())?;
        Ok(Self { config, fitter })
    }

    pub fn config(&self) -> &BandConfig {
        &self.config
    }

    /// Run deltas, range summary and band fit over `series`.
    ///
    /// Horizons longer than the series are dropped with a warning; fitting
    /// errors are returned.
    pub fn analyze(&self, series: &PriceSeries) -> Result<AnalysisReport, BandError> {
        let closes = series.closes();
        let (first, last) = match (series.first(), series.last()) {
            (Some(first), Some(last)) if closes.len() >= 2 => (first, last),
            _ => {
                return Err(BandError::InsufficientData {
                    required: 2,
                    available: closes.len(),
                })
            }
        };

        let deltas = calculate_available_deltas(&closes, &self.config.horizons);
        for horizon in &self.config.horizons {
            if !deltas.iter().any(|d| d.horizon == *horizon) {
                warn!(
                    "{}: skipping {} delta, needs {} bars but only {} available",
                    series.symbol,
                    horizon,
                    horizon.required_bars(),
                    closes.len()
                );
            }
        }

        let summary = RangeSummary::new(&closes, self.config.high_low_window).ok_or(BandError::InsufficientData {
            required: 2,
            available: closes.len(),
        })?;

        let (regression, bands) = self.fitter.fit(&closes, self.config.degree)?;
        debug!(
            "{}: order {} residual_std {:.6}",
            series.symbol, regression.fit_order, regression.residual_std
        );

        let x_offset = bands.first().map(|b| b.annotation.x_offset).unwrap_or(0.0);
        let annotation_time = last.time.add_days(x_offset);

        info!(
            "Analysis completed for {} ({} bars, {} -> {})",
            series.symbol,
            closes.len(),
            first.time,
            last.time
        );

        Ok(AnalysisReport {
            symbol: series.symbol.clone(),
            bar_count: closes.len(),
            first_time: first.time,
            last_time: last.time,
            summary,
            deltas,
            regression,
            bands,
            annotation_time,
        })
    }
}
