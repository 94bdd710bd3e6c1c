//! Bounded, aligned result tables.
//!
//! Rows are pulled from the cursor one at a time and formatted as they
//! arrive. Column widths grow with the content up to [`MAX_COLUMN_WIDTH`];
//! once a column reaches the cap it stays there and every longer cell is cut
//! to 47 characters followed by `...`.
//!
//! # Example
//!
//! ```rust
//! use sqlsh_console::TableRenderer;
//! use sqlsh_core::{ColumnInfo, Row, Value};
//! use std::sync::Arc;
//!
//! let columns = Arc::new(ColumnInfo::from_names(["id", "name"]));
//! let rows = vec![Ok(Row::with_columns(
//!     Arc::clone(&columns),
//!     vec![Value::Int(1), Value::Null],
//! ))];
//!
//! let table = TableRenderer::new(1000).render(&columns, rows).unwrap();
//! assert_eq!(
//!     table.render_plain(),
//!     "+------+------+\n| id   | name | \n+------+------+\n| 1    | NULL | \n+------+------+\n"
//! );
//! ```

use sqlsh_core::temporal::{MICROS_PER_DAY, format_timestamp};
use sqlsh_core::{ColumnInfo, Result, Row, Value};

/// Narrowest a column is ever drawn.
pub const MIN_COLUMN_WIDTH: usize = 4;
/// Widest a column is ever drawn.
pub const MAX_COLUMN_WIDTH: usize = 50;
/// Default number of rows shown per result.
pub const DEFAULT_MAX_ROWS: usize = 1000;

const ELLIPSIS: &str = "...";

/// A result cell, classified by how it is turned into text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    /// NULL, or a value missing from a short row
    Null,
    /// Raw bytes, shown decoded as text
    Bytes(&'a [u8]),
    /// A point in time, as microseconds since the Unix epoch
    Temporal(i64),
    /// Anything else, shown in its default textual form
    Other(&'a Value),
}

impl<'a> Cell<'a> {
    /// Classify a fetched value.
    ///
    /// Dates become midnight of that day, so every temporal value prints as
    /// `YYYY-MM-DD HH:MM:SS`.
    pub fn from_value(value: &'a Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bytes(bytes) => Cell::Bytes(bytes),
            Value::Date(days) => Cell::Temporal(i64::from(*days) * MICROS_PER_DAY),
            Value::Timestamp(micros) => Cell::Temporal(*micros),
            other => Cell::Other(other),
        }
    }

    /// The cell's display text, before width fitting.
    pub fn format(&self) -> String {
        match self {
            Cell::Null => format_null(),
            Cell::Bytes(bytes) => format_bytes(bytes),
            Cell::Temporal(micros) => format_temporal(*micros),
            Cell::Other(value) => format_other(value),
        }
    }
}

fn format_null() -> String {
    "NULL".to_string()
}

fn format_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn format_temporal(micros: i64) -> String {
    format_timestamp(micros)
}

fn format_other(value: &Value) -> String {
    value.to_string()
}

/// Cut `text` to the widest allowed cell: 47 characters then `...`.
fn truncate(text: &str) -> String {
    let keep = MAX_COLUMN_WIDTH - ELLIPSIS.len();
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Fit a formatted cell into its column, widening the column or truncating
/// the cell as needed.
fn fit(text: String, width: &mut usize) -> String {
    let len = text.chars().count();
    if len <= *width {
        return text;
    }
    if len > MAX_COLUMN_WIDTH {
        *width = MAX_COLUMN_WIDTH;
        truncate(&text)
    } else {
        *width = len;
        text
    }
}

/// Formats a streamed result set into a [`RenderedTable`], keeping at most
/// `max_rows` rows.
#[derive(Debug, Clone, Copy)]
pub struct TableRenderer {
    max_rows: usize,
}

impl TableRenderer {
    pub fn new(max_rows: usize) -> Self {
        Self { max_rows }
    }

    pub const fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Pull up to `max_rows` rows from `rows` and lay them out.
    ///
    /// Rows past the cap are never requested from the iterator. A fetch
    /// error aborts the render and is returned as is.
    pub fn render<I>(&self, columns: &ColumnInfo, rows: I) -> Result<RenderedTable>
    where
        I: IntoIterator<Item = Result<Row>>,
    {
        let mut widths = Vec::with_capacity(columns.len());
        let mut header = Vec::with_capacity(columns.len());
        for name in columns.names() {
            let len = name.chars().count();
            widths.push(len.clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH));
            header.push(if len > MAX_COLUMN_WIDTH {
                truncate(name)
            } else {
                name.to_string()
            });
        }

        let mut formatted = Vec::new();
        for row in rows.into_iter().take(self.max_rows) {
            let row = row?;
            let cells = widths
                .iter_mut()
                .enumerate()
                .map(|(i, width)| {
                    let cell = row.get(i).map_or(Cell::Null, Cell::from_value);
                    fit(cell.format(), width)
                })
                .collect::<Vec<_>>();
            formatted.push(cells);
        }

        tracing::debug!(
            columns = widths.len(),
            rows = formatted.len(),
            max_rows = self.max_rows,
            "Rendered result table"
        );

        Ok(RenderedTable {
            widths,
            header,
            rows: formatted,
        })
    }
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROWS)
    }
}

/// A laid-out table ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    widths: Vec<usize>,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RenderedTable {
    /// Final display width of each column.
    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Formatted cells, one vector per row.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Borders, header and rows, each line ending in `\n`.
    pub fn render_plain(&self) -> String {
        let border = self.border();
        let mut out = String::new();
        out.push_str(&border);
        out.push_str(&self.line(&self.header));
        out.push_str(&border);
        for row in &self.rows {
            out.push_str(&self.line(row));
        }
        out.push_str(&border);
        out
    }

    fn border(&self) -> String {
        let mut line = String::from("+");
        for width in &self.widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    }

    fn line(&self, cells: &[String]) -> String {
        let mut line = String::from("| ");
        for (cell, width) in cells.iter().zip(&self.widths) {
            line.push_str(&format!("{:<width$} | ", cell, width = *width));
        }
        line.push('\n');
        line
    }
}
