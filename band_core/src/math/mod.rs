pub mod delta;
pub mod polyfit;
pub mod regression_band;
pub mod stats;
