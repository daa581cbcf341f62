pub mod event_panel;
pub mod header;
pub mod month_grid;
pub mod sidebar;
