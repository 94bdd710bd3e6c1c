//! Renderables for shell output.
//!
//! - Result tables with bounded, aligned columns
//! - Row-count summaries with optional timing
//! - Failure diagnostics

pub mod diagnostic;
pub mod summary;
pub mod table;

pub use diagnostic::Diagnostic;
pub use summary::Summary;
pub use table::{Cell, DEFAULT_MAX_ROWS, MAX_COLUMN_WIDTH, MIN_COLUMN_WIDTH, RenderedTable, TableRenderer};
