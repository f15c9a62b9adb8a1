//! Calendar year-month labels used to index schedules and snapshots

use crate::error::ForecastError;
use chrono::{Datelike, Local, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar month, stored as the first day of that month
///
/// Labels are written as `MM-YYYY` (e.g. `08-2020`). Parsing also accepts an
/// unpadded month (`8-2020`) and ISO order (`2020-08`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    /// Build from a year and a 1-based month
    pub fn new(year: i32, month: u32) -> Result<Self, ForecastError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(YearMonth)
            .ok_or_else(|| ForecastError::InvalidDate {
                value: format!("{:02}-{}", month, year),
            })
    }

    /// The month containing today's local date
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        // Day 1 of an existing month always exists
        YearMonth(today.with_day(1).unwrap_or(today))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Advance by a number of calendar months
    ///
    /// Saturates at the end of chrono's supported calendar.
    pub fn plus_months(self, months: u32) -> Self {
        YearMonth(
            self.0
                .checked_add_months(Months::new(months))
                .unwrap_or(NaiveDate::MAX),
        )
    }

    /// The following calendar month
    pub fn next(self) -> Self {
        self.plus_months(1)
    }

    /// Signed number of months from `earlier` to `self`
    pub fn months_since(&self, earlier: YearMonth) -> i64 {
        (self.year() as i64 - earlier.year() as i64) * 12
            + (self.month() as i64 - earlier.month() as i64)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{}", self.month(), self.year())
    }
}

impl FromStr for YearMonth {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ForecastError::InvalidDate {
            value: s.to_string(),
        };

        let (first, second) = s.trim().split_once('-').ok_or_else(invalid)?;
        let (month, year) = if first.len() == 4 {
            (second, first)
        } else {
            (first, second)
        };

        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        if year.to_string().len() != 4 {
            return Err(invalid());
        }

        NaiveDate::from_ymd_opt(year, month, 1)
            .map(YearMonth)
            .ok_or_else(invalid)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let m: YearMonth = "08-2020".parse().unwrap();
        assert_eq!(m.year(), 2020);
        assert_eq!(m.month(), 8);
        assert_eq!(m.to_string(), "08-2020");

        // Unpadded and ISO forms
        assert_eq!("8-2020".parse::<YearMonth>().unwrap(), m);
        assert_eq!("2020-08".parse::<YearMonth>().unwrap(), m);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "2020", "13-2020", "00-2020", "aa-2020", "08-20", "08/2020"] {
            let err = bad.parse::<YearMonth>().unwrap_err();
            assert!(matches!(err, ForecastError::InvalidDate { .. }), "{bad}");
        }
    }

    #[test]
    fn test_month_arithmetic() {
        let m: YearMonth = "11-2023".parse().unwrap();
        assert_eq!(m.next().to_string(), "12-2023");
        assert_eq!(m.plus_months(2).to_string(), "01-2024");
        assert_eq!(m.plus_months(14).to_string(), "01-2025");

        let later = m.plus_months(37);
        assert_eq!(later.months_since(m), 37);
        assert_eq!(m.months_since(later), -37);
    }

    #[test]
    fn test_serde_as_label() {
        let m: YearMonth = "02-2027".parse().unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "\"02-2027\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
