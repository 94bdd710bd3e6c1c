//! Streaming result cursor.

use crate::connection::{SqliteConnection, step_failure};
use crate::statement::{Deadline, Statement};
use crate::types;
use libsqlite3_sys as ffi;
use sqlsh_core::row::ColumnInfo;
use sqlsh_core::{Result, Row, RowCursor};
use std::ffi::c_int;
use std::marker::PhantomData;
use std::sync::Arc;

/// Rows of one SQLite statement, stepped on demand.
///
/// The cursor holds the connection's statement and deadline. Dropping it
/// finalizes the statement and removes the deadline, whether or not every
/// row was read.
pub struct SqliteCursor<'conn> {
    // Field order matters: the statement is finalized before the deadline's
    // progress handler is removed.
    stmt: Statement,
    deadline: Deadline,
    db: *mut ffi::sqlite3,
    columns: Arc<ColumnInfo>,
    temporal: Vec<bool>,
    sql: String,
    finished: bool,
    fetched: usize,
    _conn: PhantomData<&'conn mut SqliteConnection>,
}

// SAFETY: the cursor mutably borrows its connection, so no other code can
// touch the handle while the cursor lives; SQLite handles may move between
// threads when not used concurrently.
unsafe impl Send for SqliteCursor<'_> {}

impl<'conn> SqliteCursor<'conn> {
    pub(crate) fn new(
        db: *mut ffi::sqlite3,
        stmt: Statement,
        deadline: Deadline,
        sql: &str,
    ) -> Self {
        let count = if stmt.is_empty() {
            0
        } else {
            // SAFETY: stmt is a valid prepared statement
            unsafe { ffi::sqlite3_column_count(stmt.raw()) }
        };
        let columns: Vec<_> = (0..count)
            // SAFETY: stmt is valid and i < column count
            .map(|i| unsafe { types::column(stmt.raw(), i) })
            .collect();
        let temporal = columns
            .iter()
            .map(|c| c.decl_type.as_deref().is_some_and(types::is_temporal_decl))
            .collect();

        Self {
            finished: stmt.is_empty(),
            stmt,
            deadline,
            db,
            columns: Arc::new(ColumnInfo::new(columns)),
            temporal,
            sql: sql.to_string(),
            fetched: 0,
            _conn: PhantomData,
        }
    }

    /// Rows returned so far.
    pub fn fetched(&self) -> usize {
        self.fetched
    }

    fn read_row(&self) -> Row {
        let values = self
            .temporal
            .iter()
            .enumerate()
            // SAFETY: the statement just returned SQLITE_ROW and i is in range
            .map(|(i, &temporal)| unsafe {
                types::read_column(self.stmt.raw(), i as c_int, temporal)
            })
            .collect();
        Row::with_columns(Arc::clone(&self.columns), values)
    }
}

impl Iterator for SqliteCursor<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        // SAFETY: stmt is valid and not finished
        let rc = unsafe { ffi::sqlite3_step(self.stmt.raw()) };
        match rc {
            ffi::SQLITE_ROW => {
                self.fetched += 1;
                Some(Ok(self.read_row()))
            }
            ffi::SQLITE_DONE => {
                self.finished = true;
                None
            }
            rc => {
                self.finished = true;
                Some(Err(step_failure(self.db, &self.sql, rc, &self.deadline)))
            }
        }
    }
}

impl RowCursor for SqliteCursor<'_> {
    fn columns(&self) -> &Arc<ColumnInfo> {
        &self.columns
    }
}

impl Drop for SqliteCursor<'_> {
    fn drop(&mut self) {
        tracing::trace!(rows = self.fetched, finished = self.finished, "Releasing cursor");
    }
}
