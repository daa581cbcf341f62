//! Calendar core shared by the browser frontend and the backend store.
//!
//! - `models` / `api`: wire types for events, snapshots and sessions
//! - `calendar` / `grid`: month cursor and the pure month-grid renderer
//! - `state`: the view-state holder driven by `CalendarAction`s
//! - `store` / `sync`: injected store capabilities and the sync layer on top
//! - `memory`: in-process store with the same push semantics as the backend

pub mod api;
pub mod calendar;
pub mod grid;
pub mod memory;
pub mod models;
pub mod state;
pub mod store;
pub mod sync;

pub use calendar::Cursor;
pub use models::{Draft, Event, EventId, EventRecord, Snapshot, StorePath, UserId};
pub use state::{CalendarAction, CalendarState};
