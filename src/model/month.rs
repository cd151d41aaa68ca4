//! Calendar months in canonical order.

use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A calendar month.
///
/// The declaration order is the calendar order, so the derived `Ord` sorts `Jan < Feb < ... <
/// Dec`. Alphabetical order (`Apr, Aug, Dec, ...`) is never correct for months.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

pub const MONTHS: [Month; 12] = [
    Month::Jan,
    Month::Feb,
    Month::Mar,
    Month::Apr,
    Month::May,
    Month::Jun,
    Month::Jul,
    Month::Aug,
    Month::Sep,
    Month::Oct,
    Month::Nov,
    Month::Dec,
];

const FULL_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

impl Month {
    /// `1` is January. Returns `None` outside `1..=12`.
    pub fn from_number(n: u32) -> Option<Self> {
        MONTHS.get(n.checked_sub(1)? as usize).copied()
    }

    pub fn of(date: NaiveDate) -> Self {
        // chrono guarantees month() is in 1..=12
        MONTHS[date.month0() as usize]
    }

    /// `1` is January.
    pub fn number(&self) -> u32 {
        *self as u32 + 1
    }

    /// The three-letter abbreviation, e.g. `Mar`.
    pub fn abbrev(&self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.abbrev())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MonthError(String);

impl Display for MonthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' is not a month name", self.0)
    }
}

impl std::error::Error for MonthError {}

impl FromStr for Month {
    type Err = MonthError;

    /// Accepts abbreviations and full names in any case: `mar`, `Mar`, `MARCH`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        MONTHS
            .iter()
            .zip(FULL_NAMES)
            .find(|(m, full)| m.abbrev().to_lowercase() == lower || *full == lower)
            .map(|(m, _)| *m)
            .ok_or_else(|| MonthError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        let mut shuffled = vec![Month::Dec, Month::Apr, Month::Aug, Month::Jan, Month::Feb];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Month::Jan, Month::Feb, Month::Apr, Month::Aug, Month::Dec]
        );
    }

    #[test]
    fn test_from_number() {
        assert_eq!(Month::from_number(1), Some(Month::Jan));
        assert_eq!(Month::from_number(12), Some(Month::Dec));
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(13), None);
    }

    #[test]
    fn test_number_round_trip() {
        for m in MONTHS {
            assert_eq!(Month::from_number(m.number()), Some(m));
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(Month::from_str("mar").unwrap(), Month::Mar);
        assert_eq!(Month::from_str("September").unwrap(), Month::Sep);
        assert!(Month::from_str("Sept").is_err());
    }

    #[test]
    fn test_of_date() {
        let d = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
        assert_eq!(Month::of(d), Month::Jul);
        assert_eq!(Month::of(d).to_string(), "Jul");
    }
}
