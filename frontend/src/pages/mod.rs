pub mod calendar;
pub mod not_found;
pub mod sign_in;
