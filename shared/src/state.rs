use crate::calendar::Cursor;
use crate::grid::{summarize_year, MonthGrid, MonthSummary};
use crate::models::{Draft, Event};
use crate::sync::SyncError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarAction {
    PreviousMonth,
    NextMonth,
    /// Jump to a month (0 = January) of the displayed year.
    SelectMonth(u32),
    ReplaceEvents(Vec<Event>),
    SetDraftDate(String),
    SetDraftTime(String),
    SetDraftTitle(String),
    ClearDraft,
}

/// Everything the calendar view holds: where it is looking, the last event
/// list the store delivered, and the unsaved new-event form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarState {
    pub cursor: Cursor,
    pub events: Vec<Event>,
    pub draft: Draft,
}

impl CalendarState {
    pub fn new(cursor: Cursor) -> Self {
        Self {
            cursor,
            events: Vec::new(),
            draft: Draft::default(),
        }
    }

    pub fn apply(&mut self, action: CalendarAction) {
        match action {
            CalendarAction::PreviousMonth => self.cursor = self.cursor.previous(),
            CalendarAction::NextMonth => self.cursor = self.cursor.next(),
            CalendarAction::SelectMonth(month) => match self.cursor.with_month(month) {
                Some(cursor) => self.cursor = cursor,
                None => tracing::warn!(month, "Ignoring selection of unknown month"),
            },
            CalendarAction::ReplaceEvents(events) => self.events = events,
            CalendarAction::SetDraftDate(date) => self.draft.date = date,
            CalendarAction::SetDraftTime(time) => self.draft.time = time,
            CalendarAction::SetDraftTitle(title) => self.draft.title = title,
            CalendarAction::ClearDraft => self.draft = Draft::default(),
        }
    }

    pub fn grid(&self) -> MonthGrid {
        MonthGrid::build(self.cursor, &self.events)
    }

    pub fn sidebar(&self) -> Vec<MonthSummary> {
        summarize_year(self.cursor, &self.events)
    }
}

/// Actions that apply the outcome of creating the draft. The draft is
/// cleared whenever the store kept the event, even if the refresh failed.
pub fn actions_after_create(result: &Result<Vec<Event>, SyncError>) -> Vec<CalendarAction> {
    match result {
        Ok(events) => vec![
            CalendarAction::ClearDraft,
            CalendarAction::ReplaceEvents(events.clone()),
        ],
        Err(e) if e.change_stored() => vec![CalendarAction::ClearDraft],
        Err(_) => Vec::new(),
    }
}
