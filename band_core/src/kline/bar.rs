use serde::{Deserialize, Serialize};

use crate::common::{
    band_error::{BandError, ErrCode},
    time::Time,
};

/// One OHLCV record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: Time,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(
        time: Time,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        autofix: bool,
    ) -> Result<Self, BandError> {
        let mut bar = Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        };

        bar.check(autofix)?;
        Ok(bar)
    }

    fn check(&mut self, autofix: bool) -> Result<(), BandError> {
        for (name, price) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !price.is_finite() || price < 0.0 {
                return Err(BandError::InvalidBar {
                    code: ErrCode::PriceBelowZero,
                    msg: format!("{} {} price={} is not a valid price", self.time, name, price),
                });
            }
        }

        let min_price = self.low.min(self.open).min(self.high).min(self.close);
        let max_price = self.low.max(self.open).max(self.high).max(self.close);

        if self.low > min_price {
            if autofix {
                self.low = min_price;
            } else {
                return Err(BandError::InvalidBar {
                    code: ErrCode::KlDataInvalid,
                    msg: format!(
                        "{} low price={} is not min of [low={}, open={}, high={}, close={}]",
                        self.time, self.low, self.low, self.open, self.high, self.close
                    ),
                });
            }
        }

        if self.high < max_price {
            if autofix {
                self.high = max_price;
            } else {
                return Err(BandError::InvalidBar {
                    code: ErrCode::KlDataInvalid,
                    msg: format!(
                        "{} high price={} is not max of [low={}, open={}, high={}, close={}]",
                        self.time, self.high, self.low, self.open, self.high, self.close
                    ),
                });
            }
        }
        Ok(())
    }
}
