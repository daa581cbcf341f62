// Database models for Diesel
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use shared::EventRecord;

/// Database representation of calendar_events
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::calendar_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CalendarEventRow {
    pub user_id: String,
    pub event_id: String,
    pub event_name: String,
    pub event_date: String,
    pub event_time: String,
    pub created_at: DateTime<Utc>,
}

impl From<CalendarEventRow> for (String, EventRecord) {
    fn from(row: CalendarEventRow) -> Self {
        (
            row.event_id,
            EventRecord {
                event_name: row.event_name,
                event_date: row.event_date,
                event_time: row.event_time,
            },
        )
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::calendar_events)]
pub struct NewCalendarEvent<'a> {
    pub user_id: &'a str,
    pub event_id: &'a str,
    pub event_name: &'a str,
    pub event_date: &'a str,
    pub event_time: &'a str,
}
