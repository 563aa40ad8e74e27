use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::band_error::{BandError, ErrCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Time {
    pub timestamp: i64,
    datetime: NaiveDateTime,
}

impl Time {
    pub fn new(timestamp: i64) -> Result<Self, BandError> {
        let datetime = DateTime::from_timestamp(timestamp, 0)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| BandError::InvalidBar {
                code: ErrCode::KlDataInvalid,
                msg: format!("invalid timestamp {}", timestamp),
            })?;
        Ok(Self {
            timestamp,
            datetime,
        })
    }

    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self {
            timestamp: datetime.and_utc().timestamp(),
            datetime,
        }
    }

    pub fn from_str(time_str: &str) -> Result<Self, BandError> {
        // Supports "YYYY-MM-DD HH:MM:SS", "YYYY-MM-DD" or "YYYYMMDD"
        let time_str = time_str.trim();
        let parse_err = |e: chrono::ParseError| BandError::InvalidBar {
            code: ErrCode::KlDataInvalid,
            msg: format!("bad time {:?}: {}", time_str, e),
        };
        let datetime = if time_str.contains(':') {
            NaiveDateTime::parse_from_str(time_str, "%Y-%m-%d %H:%M:%S").map_err(parse_err)?
        } else {
            let fmt = if time_str.contains('-') { "%Y-%m-%d" } else { "%Y%m%d" };
            let date = NaiveDate::parse_from_str(time_str, fmt).map_err(parse_err)?;
            date.and_time(NaiveTime::MIN)
        };

        Ok(Self::from_datetime(datetime))
    }

    /// Shift by a possibly fractional number of days.
    pub fn add_days(&self, days: f64) -> Self {
        let millis = (days * 86_400_000.0).round() as i64;
        Self::from_datetime(self.datetime + Duration::milliseconds(millis))
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.datetime
    }

    pub fn to_str(&self) -> String {
        self.datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    pub fn to_date_str(&self) -> String {
        self.datetime.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        let a = Time::from_str("2024-03-01 00:00:00").unwrap();
        let b = Time::from_str("2024-03-01").unwrap();
        let c = Time::from_str("20240301").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.to_date_str(), "2024-03-01");
        assert!(Time::from_str("03/01/2024").is_err());
    }

    #[test]
    fn test_roundtrip_timestamp() {
        let t = Time::from_str("2024-03-01 12:30:00").unwrap();
        assert_eq!(Time::new(t.timestamp).unwrap(), t);
    }

    #[test]
    fn test_add_days() {
        let t = Time::from_str("2024-01-01").unwrap();
        assert_eq!(t.add_days(31.0).to_date_str(), "2024-02-01");
        assert_eq!(t.add_days(0.5).to_str(), "2024-01-01 12:00:00");
    }
}
