//! Month cursor and Gregorian calendar arithmetic.

use std::fmt;

use chrono::{Datelike, Local, Months, NaiveDate};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (0 = January) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        0 | 2 | 4 | 6 | 7 | 9 | 11 => 31,
        3 | 5 | 8 | 10 => 30,
        1 if is_leap_year(year) => 29,
        1 => 28,
        _ => 0,
    }
}

/// The (year, month) pair shown by the grid. Always points at day 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor {
    first: NaiveDate,
}

impl Cursor {
    /// Cursor for `month` (0 = January) of `year`. `None` when the month
    /// index is out of range or the year is outside chrono's date range.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month.checked_add(1)?, 1).map(|first| Self { first })
    }

    /// Cursor for the month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    /// Cursor for the current month in the local time zone.
    pub fn today() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// Month index, 0 = January.
    pub fn month(&self) -> u32 {
        self.first.month0()
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[self.month() as usize]
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    /// Weekday of day 1, 0 = Sunday .. 6 = Saturday.
    pub fn first_weekday(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    /// The month before this one, rolling January back into December of the
    /// previous year. Stays put at the start of the supported date range.
    pub fn previous(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(*self)
    }

    /// The month after this one, rolling December into January of the next
    /// year. Stays put at the end of the supported date range.
    pub fn next(&self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(*self)
    }

    /// Day 1 of `month` in this cursor's year.
    pub fn with_month(&self, month: u32) -> Option<Self> {
        Self::new(self.year(), month)
    }

    /// Zero-padded `YYYY-MM-DD` for `day` of this month.
    pub fn format_day(&self, day: u32) -> String {
        format!("{:04}-{:02}-{:02}", self.year(), self.month() + 1, day)
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::today()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year())
    }
}
