pub mod analyzer;
pub mod common;
pub mod config;
pub mod kline;
pub mod math;

pub use analyzer::analyzer::{AnalysisReport, Analyzer};
pub use common::band_error::{BandError, ErrCode};
pub use config::band_config::BandConfig;
pub use kline::{bar::Bar, price_series::PriceSeries};
pub use math::delta::{calculate_available_deltas, calculate_price_differences, PriceDelta};
pub use math::regression_band::{fit_regression_bands, Band, RegressionBandFitter, RegressionResult};
