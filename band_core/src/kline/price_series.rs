use std::ops::Index;

use super::bar::Bar;
use crate::common::band_error::BandError;

/// Bars ordered by strictly increasing time.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    pub symbol: String,
    lst: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            lst: Vec::new(),
        }
    }

    /// Build from bars in any order. Duplicate timestamps are rejected.
    pub fn from_bars(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Result<Self, BandError> {
        bars.sort_by_key(|b| b.time);
        let mut series = Self::new(symbol);
        for bar in bars {
            series.push(bar)?;
        }
        Ok(series)
    }

    /// Append a bar that must be strictly later than the current last bar.
    pub fn push(&mut self, bar: Bar) -> Result<(), BandError> {
        if let Some(last) = self.lst.last() {
            if bar.time <= last.time {
                return Err(BandError::NotMonotonous(format!(
                    "{}: bar at {} does not follow {}",
                    self.symbol, bar.time, last.time
                )));
            }
        }
        self.lst.push(bar);
        Ok(())
    }

    pub fn closes(&self) -> Vec<f64> {
        self.lst.iter().map(|b| b.close).collect()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.lst
    }

    /// The last `n` bars, or all of them when fewer exist.
    pub fn tail(&self, n: usize) -> &[Bar] {
        &self.lst[self.lst.len().saturating_sub(n)..]
    }

    pub fn first(&self) -> Option<&Bar> {
        self.lst.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.lst.last()
    }

    pub fn len(&self) -> usize {
        self.lst.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lst.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.lst.iter()
    }
}

impl Index<usize> for PriceSeries {
    type Output = Bar;

    fn index(&self, index: usize) -> &Self::Output {
        &self.lst[index]
    }
}
