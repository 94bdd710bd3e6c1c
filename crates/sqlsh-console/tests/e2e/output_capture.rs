//! Fixtures for capturing console output in tests.

use sqlsh_console::{ShellConsole, TableRenderer};
use sqlsh_core::{Column, ColumnInfo, Result, Row, RowCursor, Value};
use std::sync::Arc;
use std::time::Instant;

/// An in-memory cursor that counts how many rows were pulled from it and
/// records whether it was dropped.
pub struct FixtureCursor {
    columns: Arc<ColumnInfo>,
    rows: std::vec::IntoIter<Vec<Value>>,
    pub pulled: Arc<std::sync::atomic::AtomicUsize>,
    pub dropped: Arc<std::sync::atomic::AtomicBool>,
}

impl FixtureCursor {
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: Arc::new(ColumnInfo::new(columns)),
            rows: rows.into_iter(),
            pulled: Arc::default(),
            dropped: Arc::default(),
        }
    }

    pub fn named(names: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self::new(names.iter().map(|n| Column::new(*n)).collect(), rows)
    }
}

impl Iterator for FixtureCursor {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.rows.next()?;
        self.pulled
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Some(Ok(Row::with_columns(Arc::clone(&self.columns), values)))
    }
}

impl RowCursor for FixtureCursor {
    fn columns(&self) -> &Arc<ColumnInfo> {
        &self.columns
    }
}

impl Drop for FixtureCursor {
    fn drop(&mut self) {
        self.dropped
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

/// Render `cursor` through a fresh console and return everything written.
pub fn render_to_string(cursor: FixtureCursor, max_rows: usize, timing: bool) -> String {
    let mut console = ShellConsole::new(Vec::new());
    console
        .print_result_set(&TableRenderer::new(max_rows), cursor, Instant::now(), timing)
        .expect("render should succeed");
    String::from_utf8(console.into_inner()).expect("console output is UTF-8")
}

/// Lines of the table body (between the second and last border).
pub fn body_lines(output: &str) -> Vec<&str> {
    let lines: Vec<&str> = output.lines().collect();
    let borders: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.starts_with('+'))
        .map(|(i, _)| i)
        .collect();
    lines[borders[1] + 1..borders[2]].to_vec()
}
