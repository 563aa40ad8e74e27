use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Fixed lookback horizons for price deltas, measured in bars from the
/// series end.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum Horizon {
    #[strum(to_string = "Daily", serialize = "1d")]
    Daily,
    #[strum(to_string = "Weekly", serialize = "1w")]
    Weekly,
    #[strum(to_string = "Monthly", serialize = "1m")]
    Monthly,
    #[strum(to_string = "90 Days", serialize = "90d")]
    Days90,
    #[strum(to_string = "6 Months", serialize = "6m")]
    SixMonths,
}

impl Horizon {
    /// Number of bars between the latest close and the compared close.
    /// `Days90` and `SixMonths` keep the 89/131 offsets of the dashboard
    /// rather than a calendar-exact count.
    pub fn offset(&self) -> usize {
        match self {
            Horizon::Daily => 1,
            Horizon::Weekly => 5,
            Horizon::Monthly => 21,
            Horizon::Days90 => 89,
            Horizon::SixMonths => 131,
        }
    }

    /// Bars needed for this horizon to be computable.
    pub fn required_bars(&self) -> usize {
        self.offset() + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BandColor {
    Green,
    Blue,
    Red,
    Purple,
}

/// How the fractional `sqrt(degree)` becomes an integer polynomial order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DegreeRounding {
    #[default]
    Round,
    /// Truncation, as legacy polynomial fitters did with a float degree.
    Floor,
    Ceil,
}

impl DegreeRounding {
    pub fn apply(&self, degree: f64) -> f64 {
        match self {
            DegreeRounding::Round => degree.round(),
            DegreeRounding::Floor => degree.floor(),
            DegreeRounding::Ceil => degree.ceil(),
        }
    }
}
