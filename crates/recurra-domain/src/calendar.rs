//! Calendar-date arithmetic with explicit month-length and leap-year rules.
//!
//! Nothing here relies on date overflow normalisation: months roll into the
//! next year only through [`MonthCursor::next`], and out-of-range days are
//! clamped to the last valid day of their month.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Builds the date `year-month-day`, pulling `day` back to the month's last
/// day when the month is shorter (e.g. day 31 in February).
///
/// Returns `None` only for an invalid month or a year outside chrono's range.
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = days_in_month(year, month);
    if last == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last))
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    MonthCursor::of(date).first_day()
}

pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    MonthCursor::of(date).last_day()
}

/// First day of the month following the one that contains `date`.
pub fn first_day_of_next_month(date: NaiveDate) -> NaiveDate {
    MonthCursor::of(date).next().first_day()
}

/// Adds whole years, clamping Feb 29 to Feb 28 when the target year is not a
/// leap year.
pub fn add_years_clamped(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let year = date.year().checked_add(years)?;
    clamped_date(year, date.month(), date.day())
}

/// A `(year, month)` pair that walks the calendar one month at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    /// Returns `None` when `month` is outside 1-12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following month; December rolls over into January of next year.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn first_day(&self) -> NaiveDate {
        self.day(1)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.day(self.days())
    }

    /// The given day of this month, clamped to the month's length.
    pub fn day(&self, day: u32) -> NaiveDate {
        // `month` is always 1-12 and the day is clamped, so this can only fail
        // at chrono's year limits; fall back to the last representable date.
        clamped_date(self.year, self.month, day).unwrap_or(NaiveDate::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn leap_year_rules_cover_centuries() {
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2025));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));
    }

    #[test]
    fn february_length_follows_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 4), 30);
        assert_eq!(days_in_month(2023, 13), 0);
    }

    #[test]
    fn clamped_date_pulls_day_back_into_month() {
        assert_eq!(clamped_date(2023, 2, 31), Some(date(2023, 2, 28)));
        assert_eq!(clamped_date(2024, 2, 30), Some(date(2024, 2, 29)));
        assert_eq!(clamped_date(2023, 4, 31), Some(date(2023, 4, 30)));
        assert_eq!(clamped_date(2023, 0, 1), None);
    }

    #[test]
    fn month_cursor_rolls_december_into_next_year() {
        let dec = MonthCursor::of(date(2024, 12, 17));
        let jan = dec.next();
        assert_eq!((jan.year(), jan.month()), (2025, 1));
        assert_eq!(first_day_of_next_month(date(2024, 12, 17)), date(2025, 1, 1));
        assert_eq!(last_day_of_month(date(2024, 2, 3)), date(2024, 2, 29));
        assert_eq!(first_day_of_month(date(2024, 2, 3)), date(2024, 2, 1));
    }

    #[test]
    fn adding_years_clamps_leap_day() {
        assert_eq!(add_years_clamped(date(2024, 2, 29), 1), Some(date(2025, 2, 28)));
        assert_eq!(add_years_clamped(date(2024, 2, 29), 4), Some(date(2028, 2, 29)));
        assert_eq!(add_years_clamped(date(2024, 6, 30), 50), Some(date(2074, 6, 30)));
    }
}
