//! Month grid and sidebar summaries, derived from a cursor and the cached
//! event list. Everything here is a pure function of its inputs.

use crate::calendar::{Cursor, MONTH_NAMES};
use crate::models::Event;

/// One day of the displayed month with the events dated on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    /// `YYYY-MM-DD`, the string event dates are compared against.
    pub date: String,
    pub events: Vec<Event>,
}

impl DayCell {
    pub fn has_event(&self) -> bool {
        !self.events.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    Blank,
    Day(&'a DayCell),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub cursor: Cursor,
    /// Blank cells before day 1 so that it lands in its weekday column.
    pub leading_blanks: u32,
    pub days: Vec<DayCell>,
}

impl MonthGrid {
    /// Lay out `cursor`'s month. An event lands on a day only when its
    /// `eventDate` is exactly the day's `YYYY-MM-DD` string; malformed dates
    /// match no day.
    pub fn build(cursor: Cursor, events: &[Event]) -> Self {
        let days = (1..=cursor.days_in_month())
            .map(|day| {
                let date = cursor.format_day(day);
                let events = events
                    .iter()
                    .filter(|event| event.date() == date)
                    .cloned()
                    .collect();
                DayCell { day, date, events }
            })
            .collect();

        Self {
            cursor,
            leading_blanks: cursor.first_weekday(),
            days,
        }
    }

    /// Cells in display order: leading blanks, then days 1..=n.
    pub fn cells(&self) -> impl Iterator<Item = Cell<'_>> {
        (0..self.leading_blanks)
            .map(|_| Cell::Blank)
            .chain(self.days.iter().map(Cell::Day))
    }

    pub fn day(&self, day: u32) -> Option<&DayCell> {
        self.days.get(day.checked_sub(1)? as usize)
    }

    /// All events shown somewhere in this month, in day order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.days.iter().flat_map(|cell| cell.events.iter())
    }
}

/// Sidebar entry for one month of the displayed year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSummary {
    /// 0 = January.
    pub month: u32,
    pub name: &'static str,
    pub count: usize,
    pub active: bool,
}

/// Year and 1-based month of an `eventDate`, read from the first two
/// `-`-separated segments. `None` when either is not an integer.
pub fn parse_year_month(date: &str) -> Option<(i32, u32)> {
    let mut parts = date.split('-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    Some((year, month))
}

/// Per-month event counts for the cursor's year.
pub fn summarize_year(cursor: Cursor, events: &[Event]) -> Vec<MonthSummary> {
    let parsed: Vec<(i32, u32)> = events
        .iter()
        .filter_map(|event| parse_year_month(event.date()))
        .collect();

    MONTH_NAMES
        .iter()
        .zip(0u32..)
        .map(|(&name, month)| MonthSummary {
            month,
            name,
            count: parsed
                .iter()
                .filter(|&&(year, number)| year == cursor.year() && number == month + 1)
                .count(),
            active: month == cursor.month(),
        })
        .collect()
}
