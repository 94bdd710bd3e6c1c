//! End-to-end tests that drive the console renderer the way the shell does:
//! a cursor of rows in, captured bytes out.
//!
//! - `output_capture`: captured sink and cursor fixtures
//! - `result_tables`: table layout, truncation and row cap
//! - `summaries`: row-count phrasing, timing footer and diagnostics

pub mod output_capture;
pub mod result_tables;
pub mod summaries;
