//! Calendar arithmetic shared by the contract engine.
//!
//! Contract dates use end-of-day semantics: a version that ends "on" a day
//! covers that whole day, so chained versions touch without overlapping.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Returns the given moment clamped to the start of its calendar day.
#[must_use]
pub fn start_of_day(moment: DateTime<Utc>) -> DateTime<Utc> {
    moment.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Returns the given moment clamped to the end of its calendar day.
#[must_use]
pub fn end_of_day(moment: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(moment) + Duration::days(1) - Duration::milliseconds(1)
}

/// Returns the end of the calendar day before the given moment.
///
/// This is the end date a contract version receives when its successor
/// starts at `moment`.
#[must_use]
pub fn previous_day_end(moment: DateTime<Utc>) -> DateTime<Utc> {
    end_of_day(moment - Duration::days(1))
}

/// Returns the end of the given moment's calendar month.
#[must_use]
pub fn end_of_month(moment: DateTime<Utc>) -> DateTime<Utc> {
    let date = moment.date_naive();
    let (year, month) = month_after(date.year(), date.month());
    first_of_month(year, month)
        .and_time(NaiveTime::MIN)
        .and_utc()
        - Duration::milliseconds(1)
}

/// Returns the end of the calendar month following the given moment's month.
///
/// Employee inactivity dates are set to this value when the last open
/// contract ends.
#[must_use]
pub fn end_of_following_month(moment: DateTime<Utc>) -> DateTime<Utc> {
    let date = moment.date_naive();
    let (year, month) = month_after(date.year(), date.month());
    end_of_month(
        first_of_month(year, month)
            .and_time(NaiveTime::MIN)
            .and_utc(),
    )
}

fn month_after(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// Day tallies over an inclusive date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayCounts {
    /// Days that are neither Sundays nor public holidays.
    pub business_days: u32,
    /// Public holidays falling on a day other than Sunday.
    pub holidays: u32,
    /// Sundays.
    pub sundays: u32,
}

/// Month-level day tallies used to pro-rate contract hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthDayRatio {
    /// Business days in the month.
    pub business_days: u32,
    /// Non-Sunday public holidays in the month.
    pub holidays: u32,
}

/// Tallies business days, holidays and Sundays between two moments.
///
/// Both bounds are inclusive at day granularity; an inverted range counts
/// nothing.
#[must_use]
pub fn day_counts_between(start: DateTime<Utc>, end: DateTime<Utc>) -> DayCounts {
    let mut counts = DayCounts::default();
    let mut date = start.date_naive();
    let last = end.date_naive();

    while date <= last {
        if date.weekday() == Weekday::Sun {
            counts.sundays += 1;
        } else if is_public_holiday(date) {
            counts.holidays += 1;
        } else {
            counts.business_days += 1;
        }
        date = date + Duration::days(1);
    }

    counts
}

/// Returns whether the given date is a French public holiday.
#[must_use]
pub fn is_public_holiday(date: NaiveDate) -> bool {
    let fixed = matches!(
        (date.month(), date.day()),
        (1, 1) | (5, 1) | (5, 8) | (7, 14) | (8, 15) | (11, 1) | (11, 11) | (12, 25)
    );
    if fixed {
        return true;
    }

    let easter = easter_sunday(date.year());
    date == easter + Duration::days(1)
        || date == easter + Duration::days(39)
        || date == easter + Duration::days(50)
}

/// Returns Easter Sunday for the given year (Gregorian computus).
#[must_use]
pub fn easter_sunday(year: i32) -> NaiveDate {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = u32::try_from((h + l - 7 * m + 114) / 31).unwrap_or(3);
    let day = u32::try_from((h + l - 7 * m + 114) % 31 + 1).unwrap_or(1);

    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};
    use proptest::prelude::*;

    use super::*;

    fn utc(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(year, month, day, hour, 0, 0) {
            chrono::offset::LocalResult::Single(moment) => moment,
            _ => panic!("invalid test date"),
        }
    }

    #[test]
    fn end_of_day_is_last_millisecond() {
        let end = end_of_day(utc(2024, 3, 15, 9));
        assert_eq!(end.date_naive().to_string(), "2024-03-15");
        assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
    }

    #[test]
    fn previous_day_end_crosses_month_boundary() {
        let end = previous_day_end(utc(2024, 3, 1, 0));
        assert_eq!(end.date_naive().to_string(), "2024-02-29");
    }

    #[test]
    fn end_of_month_handles_december() {
        let end = end_of_month(utc(2023, 12, 5, 10));
        assert_eq!(end.date_naive().to_string(), "2023-12-31");
    }

    #[test]
    fn end_of_following_month_rolls_over_year() {
        let end = end_of_following_month(utc(2023, 12, 20, 10));
        assert_eq!(end.date_naive().to_string(), "2024-01-31");
    }

    #[test]
    fn easter_sunday_known_years() {
        assert_eq!(easter_sunday(2024).to_string(), "2024-03-31");
        assert_eq!(easter_sunday(2025).to_string(), "2025-04-20");
        assert_eq!(easter_sunday(2026).to_string(), "2026-04-05");
    }

    #[test]
    fn bastille_day_is_a_holiday() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 14).unwrap_or(NaiveDate::MIN);
        assert!(is_public_holiday(date));
    }

    #[test]
    fn whit_monday_is_a_holiday() {
        // Easter 2024 is March 31st, so Whit Monday falls on May 20th.
        let date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap_or(NaiveDate::MIN);
        assert!(is_public_holiday(date));
    }

    #[test]
    fn day_counts_over_a_plain_week() {
        // Monday 2024-03-11 through Sunday 2024-03-17: no holidays.
        let counts = day_counts_between(utc(2024, 3, 11, 0), utc(2024, 3, 17, 23));
        assert_eq!(counts.business_days, 6);
        assert_eq!(counts.holidays, 0);
        assert_eq!(counts.sundays, 1);
    }

    #[test]
    fn day_counts_separate_holidays() {
        // Wednesday 2024-05-01 (Labour Day) through Friday 2024-05-03.
        let counts = day_counts_between(utc(2024, 5, 1, 0), utc(2024, 5, 3, 23));
        assert_eq!(counts.business_days, 2);
        assert_eq!(counts.holidays, 1);
        assert_eq!(counts.sundays, 0);
    }

    #[test]
    fn inverted_range_counts_nothing() {
        let counts = day_counts_between(utc(2024, 3, 17, 0), utc(2024, 3, 11, 0));
        assert_eq!(counts, DayCounts::default());
    }

    proptest! {
        #[test]
        fn day_counts_partition_the_range(offset in 0i64..720, length in 0i64..90) {
            let start = utc(2024, 1, 1, 0) + Duration::days(offset);
            let end = start + Duration::days(length);
            let counts = day_counts_between(start, end);
            let total = counts.business_days + counts.holidays + counts.sundays;
            prop_assert_eq!(i64::from(total), length + 1);
        }
    }
}
