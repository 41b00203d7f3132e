//! ISO-8601 week identity.
//!
//! Every week snapshot is addressed by a [`WeekId`]: the ISO week-year and
//! the ISO week number (weeks run Monday to Sunday, week 1 holds the first
//! Thursday of the year). Dates around new year therefore resolve to the
//! week-year they belong to, e.g. 2025-12-29 is `2026-W1`.
//!
//! Identifiers order by `(year, week)`, which is calendar order. Their
//! string form `YEAR-Wn` is only used for display and persistence.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekId {
    year: i32,
    week: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeekIdParseError {
    #[error("week identifier '{0}' is not of the form YEAR-Wn")]
    Format(String),
    #[error("week {week} does not exist in ISO year {year}")]
    OutOfRange { year: i32, week: u32 },
}

/// The identifier of the ISO week containing `date`.
///
/// This is the only way dates are turned into week keys, for reads and
/// writes alike.
pub fn week_identifier_of(date: NaiveDate) -> WeekId {
    WeekId::of(date)
}

impl WeekId {
    pub fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// Build an identifier, rejecting weeks the ISO year does not have
    pub fn new(year: i32, week: u32) -> Result<Self, WeekIdParseError> {
        match NaiveDate::from_isoywd_opt(year, week, Weekday::Mon) {
            Some(_) => Ok(Self { year, week }),
            None => Err(WeekIdParseError::OutOfRange { year, week }),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    /// Monday of this week
    pub fn start_date(&self) -> NaiveDate {
        // year/week were validated on construction
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon).unwrap_or_default()
    }

    /// Sunday of this week
    pub fn end_date(&self) -> NaiveDate {
        self.start_date() + Duration::days(6)
    }

    /// The identifier `weeks` weeks later (or earlier when negative)
    pub fn offset(&self, weeks: i64) -> Self {
        Self::of(self.start_date() + Duration::weeks(weeks))
    }

    /// Calendar date of a weekday within this week
    pub fn date_of(&self, weekday: Weekday) -> NaiveDate {
        self.start_date() + Duration::days(weekday.num_days_from_monday() as i64)
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{}", self.year, self.week)
    }
}

impl FromStr for WeekId {
    type Err = WeekIdParseError;

    /// Accepts `2026-W1` as well as the zero padded `2026-W01`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_error = || WeekIdParseError::Format(s.to_string());
        let (year, week) = s.trim().split_once("-W").ok_or_else(format_error)?;
        let year: i32 = year.parse().map_err(|_| format_error())?;
        let week: u32 = week.parse().map_err(|_| format_error())?;
        Self::new(year, week)
    }
}

impl Serialize for WeekId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_identifier_is_stable() {
        let d = date(2026, 10, 14);
        assert_eq!(week_identifier_of(d), week_identifier_of(d));
        assert_eq!(week_identifier_of(d).to_string(), "2026-W42");
    }

    #[test]
    fn test_year_boundary_uses_iso_week_year() {
        // Monday 2025-12-29 .. Sunday 2026-01-04 is ISO week 1 of 2026
        let dec_29 = week_identifier_of(date(2025, 12, 29));
        let jan_2 = week_identifier_of(date(2026, 1, 2));
        assert_eq!(dec_29, jan_2);
        assert_eq!(dec_29.to_string(), "2026-W1");

        let previous = week_identifier_of(date(2025, 12, 28));
        assert_eq!(previous.to_string(), "2025-W52");
        assert!(previous < dec_29);
        assert_eq!(previous.offset(1), dec_29);
    }

    #[test]
    fn test_week_53_belongs_to_previous_year() {
        let id = week_identifier_of(date(2021, 1, 3));
        assert_eq!(id.to_string(), "2020-W53");
        assert_eq!(id, week_identifier_of(date(2020, 12, 31)));
    }

    #[test]
    fn test_ordering_follows_calendar_not_strings() {
        let week_2 = WeekId::new(2026, 2).unwrap();
        let week_10 = WeekId::new(2026, 10).unwrap();
        assert!(week_2 < week_10);
        assert!(week_2.to_string() > week_10.to_string());
    }

    #[test]
    fn test_parse_accepts_padding_and_rejects_garbage() {
        assert_eq!("2026-W01".parse::<WeekId>().unwrap(), WeekId::new(2026, 1).unwrap());
        assert!("2026-01".parse::<WeekId>().is_err());
        assert!("abcd-W3".parse::<WeekId>().is_err());
        assert_eq!(
            "2021-W53".parse::<WeekId>(),
            Err(WeekIdParseError::OutOfRange { year: 2021, week: 53 })
        );
    }

    #[test]
    fn test_start_and_end_dates() {
        let id = WeekId::new(2026, 1).unwrap();
        assert_eq!(id.start_date(), date(2025, 12, 29));
        assert_eq!(id.end_date(), date(2026, 1, 4));
        assert_eq!(id.date_of(Weekday::Thu), date(2026, 1, 1));
    }

    #[test]
    fn test_serde_uses_string_form() {
        let id = WeekId::new(2026, 7).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"2026-W7\"");
        let back: WeekId = serde_json::from_str("\"2026-W07\"").unwrap();
        assert_eq!(back, id);
    }
}
