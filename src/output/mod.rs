//! Output writers
//!
//! Persists the three artifacts of a run: the raw fetched pages (numbered
//! HTML files), the structured records (JSON), and the calendar file (RFC
//! 5545, hand-rendered with proper escaping and line folding).

mod calendar;
mod json;
mod pages;

pub use calendar::{generate_ics, save_calendar, CalendarOptions};
pub use json::{load_records, save_records};
pub use pages::{load_pages, save_pages};
