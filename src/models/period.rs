//! Date ranges and report periods.
//!
//! This module contains the half-open [`DateRange`] used for every date
//! filter in the crate, and [`ReportPeriod`], the named periods a report can
//! be scoped to.

use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A half-open calendar interval `[start, end)`.
///
/// # Example
///
/// ```
/// use attendance_payroll::models::DateRange;
/// use chrono::NaiveDate;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
/// )
/// .unwrap();
///
/// assert!(range.contains(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())); // start
/// assert!(range.contains(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap())); // last day
/// assert!(!range.contains(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap())); // end is exclusive
/// assert_eq!(range.num_days(), 31);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    /// First day inside the range.
    pub start: NaiveDate,
    /// First day after the range.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting an end that precedes the start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if end < start {
            return Err(EngineError::validation(
                "range",
                format!("end {} is before start {}", end, start),
            ));
        }
        Ok(Self { start, end })
    }

    /// The range covering exactly one day.
    pub fn single_day(date: NaiveDate) -> EngineResult<Self> {
        Self::new(date, next_day(date)?)
    }

    /// Checks if a date falls within the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Number of days in the range.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = EngineError;

    fn try_from(raw: RawDateRange) -> EngineResult<Self> {
        Self::new(raw.start, raw.end)
    }
}

/// The first day of a reporting week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    /// ISO weeks.
    #[default]
    Monday,
    /// Weeks starting on Sunday.
    Sunday,
}

/// A named reporting period, resolved against the caller's current date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "period", rename_all = "snake_case")]
pub enum ReportPeriod {
    /// The current day.
    Today,
    /// The week containing the current day.
    ThisWeek,
    /// The calendar month containing the current day.
    ThisMonth,
    /// The calendar month before the current one.
    LastMonth,
    /// An explicit half-open range.
    Custom {
        /// First day inside the range.
        start: NaiveDate,
        /// First day after the range.
        end: NaiveDate,
    },
}

impl ReportPeriod {
    /// Resolves the period to a concrete range.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_payroll::models::{ReportPeriod, WeekStart};
    /// use chrono::NaiveDate;
    ///
    /// // 2026-03-04 is a Wednesday
    /// let today = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
    /// let week = ReportPeriod::ThisWeek.resolve(today, WeekStart::Monday).unwrap();
    /// assert_eq!(week.start, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    /// assert_eq!(week.end, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
    ///
    /// let last = ReportPeriod::LastMonth.resolve(today, WeekStart::Monday).unwrap();
    /// assert_eq!(last.start, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
    /// assert_eq!(last.end, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    /// ```
    pub fn resolve(&self, today: NaiveDate, week_start: WeekStart) -> EngineResult<DateRange> {
        match self {
            ReportPeriod::Today => DateRange::single_day(today),
            ReportPeriod::ThisWeek => {
                let offset = match week_start {
                    WeekStart::Monday => today.weekday().num_days_from_monday(),
                    WeekStart::Sunday => today.weekday().num_days_from_sunday(),
                };
                let start = today
                    .checked_sub_days(Days::new(u64::from(offset)))
                    .ok_or_else(out_of_range)?;
                let end = start.checked_add_days(Days::new(7)).ok_or_else(out_of_range)?;
                DateRange::new(start, end)
            }
            ReportPeriod::ThisMonth => {
                let start = first_of_month(today.year(), today.month())?;
                DateRange::new(start, first_of_next_month(start)?)
            }
            ReportPeriod::LastMonth => {
                let end = first_of_month(today.year(), today.month())?;
                let start = if end.month() == 1 {
                    first_of_month(end.year() - 1, 12)?
                } else {
                    first_of_month(end.year(), end.month() - 1)?
                };
                DateRange::new(start, end)
            }
            ReportPeriod::Custom { start, end } => DateRange::new(*start, *end),
        }
    }
}

impl FromStr for ReportPeriod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(ReportPeriod::Today),
            "this_week" => Ok(ReportPeriod::ThisWeek),
            "this_month" => Ok(ReportPeriod::ThisMonth),
            "last_month" => Ok(ReportPeriod::LastMonth),
            other => Err(EngineError::validation(
                "period",
                format!("unknown period '{}'", other),
            )),
        }
    }
}

fn out_of_range() -> EngineError {
    EngineError::validation("period", "date out of supported range")
}

fn next_day(date: NaiveDate) -> EngineResult<NaiveDate> {
    date.succ_opt().ok_or_else(out_of_range)
}

fn first_of_month(year: i32, month: u32) -> EngineResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)
}

fn first_of_next_month(first: NaiveDate) -> EngineResult<NaiveDate> {
    if first.month() == 12 {
        first_of_month(first.year() + 1, 1)
    } else {
        first_of_month(first.year(), first.month() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        let result = DateRange::new(make_date("2026-03-05"), make_date("2026-03-04"));
        assert!(matches!(result, Err(EngineError::Validation { field, .. }) if field == "range"));
    }

    #[test]
    fn test_deserialization_validates_bounds() {
        let range: DateRange =
            serde_json::from_str(r#"{"start": "2026-03-02", "end": "2026-03-09"}"#).unwrap();
        assert_eq!(range.num_days(), 7);

        let inverted = serde_json::from_str::<DateRange>(
            r#"{"start": "2026-03-09", "end": "2026-03-02"}"#,
        );
        let message = inverted.unwrap_err().to_string();
        assert!(message.contains("end 2026-03-02 is before start 2026-03-09"));
    }

    #[test]
    fn test_empty_range_contains_nothing() {
        let range = DateRange::new(make_date("2026-03-05"), make_date("2026-03-05")).unwrap();
        assert!(!range.contains(make_date("2026-03-05")));
        assert_eq!(range.num_days(), 0);
    }

    #[test]
    fn test_today_is_single_day() {
        let today = make_date("2026-03-04");
        let range = ReportPeriod::Today.resolve(today, WeekStart::Monday).unwrap();
        assert_eq!(range.start, today);
        assert_eq!(range.end, make_date("2026-03-05"));
    }

    #[test]
    fn test_this_week_on_week_start_day() {
        // Monday
        let today = make_date("2026-03-02");
        let range = ReportPeriod::ThisWeek.resolve(today, WeekStart::Monday).unwrap();
        assert_eq!(range.start, today);
        assert_eq!(range.num_days(), 7);
    }

    #[test]
    fn test_this_week_starting_sunday() {
        // Wednesday 2026-03-04, preceding Sunday is 2026-03-01
        let range = ReportPeriod::ThisWeek
            .resolve(make_date("2026-03-04"), WeekStart::Sunday)
            .unwrap();
        assert_eq!(range.start, make_date("2026-03-01"));
        assert_eq!(range.end, make_date("2026-03-08"));
    }

    #[test]
    fn test_this_month_across_year_end() {
        let range = ReportPeriod::ThisMonth
            .resolve(make_date("2026-12-15"), WeekStart::Monday)
            .unwrap();
        assert_eq!(range.start, make_date("2026-12-01"));
        assert_eq!(range.end, make_date("2027-01-01"));
    }

    #[test]
    fn test_last_month_in_january() {
        let range = ReportPeriod::LastMonth
            .resolve(make_date("2026-01-10"), WeekStart::Monday)
            .unwrap();
        assert_eq!(range.start, make_date("2025-12-01"));
        assert_eq!(range.end, make_date("2026-01-01"));
    }

    #[test]
    fn test_last_month_handles_short_february() {
        let range = ReportPeriod::LastMonth
            .resolve(make_date("2026-03-31"), WeekStart::Monday)
            .unwrap();
        assert_eq!(range.start, make_date("2026-02-01"));
        assert_eq!(range.num_days(), 28);
    }

    #[test]
    fn test_custom_period_is_validated() {
        let period = ReportPeriod::Custom {
            start: make_date("2026-03-09"),
            end: make_date("2026-03-02"),
        };
        assert!(period.resolve(make_date("2026-03-04"), WeekStart::Monday).is_err());
    }

    #[test]
    fn test_parse_period_names() {
        assert_eq!("today".parse::<ReportPeriod>().unwrap(), ReportPeriod::Today);
        assert_eq!("This_Week".parse::<ReportPeriod>().unwrap(), ReportPeriod::ThisWeek);
        assert_eq!("last_month".parse::<ReportPeriod>().unwrap(), ReportPeriod::LastMonth);
        assert!("fortnight".parse::<ReportPeriod>().is_err());
    }

    #[test]
    fn test_period_deserialization() {
        let period: ReportPeriod = serde_json::from_str(r#"{"period": "this_month"}"#).unwrap();
        assert_eq!(period, ReportPeriod::ThisMonth);

        let custom: ReportPeriod = serde_json::from_str(
            r#"{"period": "custom", "start": "2026-03-02", "end": "2026-03-09"}"#,
        )
        .unwrap();
        assert_eq!(
            custom,
            ReportPeriod::Custom {
                start: make_date("2026-03-02"),
                end: make_date("2026-03-09"),
            }
        );
    }
}
