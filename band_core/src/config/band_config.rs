use std::collections::HashMap;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::common::{
    band_error::BandError,
    enums::{DegreeRounding, Horizon},
};
use crate::math::regression_band::{FitterConfig, MAX_BANDS, MAX_DEGREE, MIN_DEGREE};

/// Band analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandConfig {
    /// Smoothing slider value, fitted as `sqrt(degree)`
    pub degree: u32,
    pub num_bands: usize,
    pub degree_rounding: DegreeRounding,
    /// Label offset past the last bar as a share of the series length
    pub annotation_offset_ratio: f64,
    pub horizons: Vec<Horizon>,
    /// Bars in the rolling high/low window (252 trading days = 52 weeks)
    pub high_low_window: usize,
    /// Repair bars whose high/low do not bound open/close
    pub autofix: bool,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            degree: 12,
            num_bands: MAX_BANDS,
            degree_rounding: DegreeRounding::Round,
            annotation_offset_ratio: 0.2,
            horizons: Horizon::iter().collect(),
            high_low_window: 252,
            autofix: false,
        }
    }
}

impl BandConfig {
    pub fn new(conf: Option<HashMap<String, serde_json::Value>>) -> Result<Self, BandError> {
        let mut conf = ConfigWithCheck::new(conf.unwrap_or_default());
        let default = Self::default();

        let degree_rounding = match conf.get::<String>("degree_rounding")? {
            Some(s) => DegreeRounding::from_str(&s)
                .map_err(|_| BandError::Config(format!("unknown degree_rounding={}", s)))?,
            None => default.degree_rounding,
        };

        let horizons = match conf.get::<Vec<String>>("horizons")? {
            Some(names) => names
                .iter()
                .map(|n| {
                    Horizon::from_str(n).map_err(|_| BandError::Config(format!("unknown horizon={}", n)))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => default.horizons,
        };

        let config = Self {
            degree: conf.get("degree")?.unwrap_or(default.degree),
            num_bands: conf.get("num_bands")?.unwrap_or(default.num_bands),
            degree_rounding,
            annotation_offset_ratio: conf
                .get("annotation_offset_ratio")?
                .unwrap_or(default.annotation_offset_ratio),
            horizons,
            high_low_window: conf.get("high_low_window")?.unwrap_or(default.high_low_window),
            autofix: conf.get("autofix")?.unwrap_or(default.autofix),
        };

        conf.check()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON object of config keys.
    pub fn from_json_str(json: &str) -> Result<Self, BandError> {
        let conf: HashMap<String, serde_json::Value> =
            serde_json::from_str(json).map_err(|e| BandError::Config(format!("bad config json: {}", e)))?;
        Self::new(Some(conf))
    }

    pub fn validate(&self) -> Result<(), BandError> {
        if !(MIN_DEGREE..=MAX_DEGREE).contains(&self.degree) {
            return Err(BandError::InvalidParameter(format!(
                "degree={} must be in [{}, {}]",
                self.degree, MIN_DEGREE, MAX_DEGREE
            )));
        }
        if self.num_bands == 0 || self.num_bands > MAX_BANDS {
            return Err(BandError::InvalidParameter(format!(
                "num_bands={} must be in [1, {}]",
                self.num_bands, MAX_BANDS
            )));
        }
        if self.high_low_window == 0 {
            return Err(BandError::InvalidParameter("high_low_window must be positive".to_string()));
        }
        Ok(())
    }

    pub fn fitter_config(&self) -> FitterConfig {
        FitterConfig {
            num_bands: self.num_bands,
            rounding: self.degree_rounding,
            annotation_offset_ratio: self.annotation_offset_ratio,
        }
    }
}

/// Key/value config that tracks which keys were consumed, so leftovers can
/// be reported as unknown.
#[derive(Debug)]
pub struct ConfigWithCheck {
    conf: HashMap<String, serde_json::Value>,
}

impl ConfigWithCheck {
    pub fn new(conf: HashMap<String, serde_json::Value>) -> Self {
        Self { conf }
    }

    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>, BandError> {
        match self.conf.remove(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(v) => serde_json::from_value(v)
                .map(Some)
                .map_err(|e| BandError::Config(format!("bad value for {}: {}", key, e))),
        }
    }

    pub fn check(&self) -> Result<(), BandError> {
        if self.conf.is_empty() {
            return Ok(());
        }
        let mut keys: Vec<&str> = self.conf.keys().map(String::as_str).collect();
        keys.sort_unstable();
        Err(BandError::Config(format!("unknown para = {}", keys.join(", "))))
    }
}
