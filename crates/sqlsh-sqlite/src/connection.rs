//! SQLite connection implementation.
//!
//! Safe wrappers around the SQLite C API (through `libsqlite3-sys`) that
//! implement the `Connection` trait from sqlsh-core. Every statement runs
//! under a [`Deadline`]; crossing it interrupts the statement and surfaces
//! `Error::Timeout`.

// Casts here match C types exactly
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::borrow_as_ptr)]

use crate::cursor::SqliteCursor;
use crate::statement::{Deadline, Statement};
use asupersync::{Cx, Outcome};
use libsqlite3_sys as ffi;
use sqlsh_core::error::{ConnectionError, ConnectionErrorKind, QueryError, QueryErrorKind};
use sqlsh_core::{Connection, ConnectionConfig, Error, Result, ServerInfo};
use std::ffi::{CStr, CString, c_char, c_int};
use std::future::Future;
use std::ptr;
use std::time::Duration;

// libsqlite3-sys blocklists `sqlite3_close_v2` from its generated bindings;
// the bundled amalgamation still exports it.
unsafe extern "C" {
    fn sqlite3_close_v2(db: *mut ffi::sqlite3) -> c_int;
}

/// Product name reported by [`SqliteConnection::server_info`].
pub const PRODUCT: &str = "SQLite";

/// A connection to a SQLite database.
#[derive(Debug)]
pub struct SqliteConnection {
    db: *mut ffi::sqlite3,
    path: String,
    config: ConnectionConfig,
}

// SAFETY: every method takes &mut self (or self), so the handle is never used
// from two threads at once. SQLite handles may move between threads.
unsafe impl Send for SqliteConnection {}

impl SqliteConnection {
    /// Open the configured database and check it with `SELECT 1`.
    ///
    /// The file is created if missing unless `read_only` is set.
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let flags = if config.read_only {
            ffi::SQLITE_OPEN_READONLY
        } else {
            ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE
        };

        let db = open_handle(&config.database, flags, config.busy_timeout).map_err(
            |(code, message)| {
                Error::Connection(ConnectionError {
                    kind: if code == ffi::SQLITE_CANTOPEN {
                        ConnectionErrorKind::Refused
                    } else {
                        ConnectionErrorKind::Connect
                    },
                    message: format!("Failed to open database: {}", message),
                    source: None,
                })
            },
        )?;

        let conn = Self {
            db,
            path: config.database.clone(),
            config: config.clone(),
        };
        if let Err(e) = health_check(conn.db, "SELECT 1", config.connect_timeout) {
            return Err(Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Connect,
                message: format!("Health check failed: {}", e),
                source: Some(Box::new(e)),
            }));
        }

        tracing::info!(
            database = %conn.path,
            read_only = config.read_only,
            "Opened SQLite database"
        );
        Ok(conn)
    }

    /// Open an in-memory database with default settings.
    pub fn open_memory() -> Result<Self> {
        Self::open(&ConnectionConfig::default())
    }

    /// The database currently selected.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Prepare the first statement of `sql` and return a cursor over its rows.
    ///
    /// Column metadata is read before any row is stepped. Statements after
    /// the first are not run.
    pub fn query_sync(&mut self, sql: &str, timeout: Duration) -> Result<SqliteCursor<'_>> {
        let deadline = Deadline::start(self.db, timeout);
        let c_sql = to_cstring(sql)?;
        let (stmt, rest) = prepare(self.db, &c_sql, 0, sql, &deadline)?;
        if c_sql.as_bytes()[rest..].iter().any(|b| !b.is_ascii_whitespace()) {
            tracing::debug!(sql = %sql, "Ignoring statements after the first in a query");
        }
        Ok(SqliteCursor::new(self.db, stmt, deadline, sql))
    }

    /// Run every statement in `sql` to completion and return the number of
    /// rows they inserted, updated or deleted.
    pub fn execute_sync(&mut self, sql: &str, timeout: Duration) -> Result<u64> {
        let deadline = Deadline::start(self.db, timeout);
        let c_sql = to_cstring(sql)?;
        let end = c_sql.as_bytes().len();
        let mut offset = 0;
        let mut affected = 0_u64;

        while offset < end {
            let (stmt, next) = prepare(self.db, &c_sql, offset, sql, &deadline)?;
            if next <= offset {
                break;
            }
            offset = next;
            if stmt.is_empty() {
                continue;
            }

            // SAFETY: db is open
            let before = unsafe { ffi::sqlite3_total_changes64(self.db) };
            loop {
                // SAFETY: stmt is a valid prepared statement
                match unsafe { ffi::sqlite3_step(stmt.raw()) } {
                    ffi::SQLITE_ROW => {}
                    ffi::SQLITE_DONE => break,
                    rc => return Err(step_failure(self.db, sql, rc, &deadline)),
                }
            }
            // sqlite3_changes keeps the count of the last DML statement, so
            // only trust it when this statement changed something.
            // SAFETY: db is open
            let (after, changes) =
                unsafe { (ffi::sqlite3_total_changes64(self.db), ffi::sqlite3_changes64(self.db)) };
            if after != before {
                affected += changes.max(0) as u64;
            }
        }

        Ok(affected)
    }

    fn use_database_sync(&mut self, name: &str) -> Result<()> {
        let flags = if self.config.read_only {
            ffi::SQLITE_OPEN_READONLY
        } else {
            ffi::SQLITE_OPEN_READWRITE
        };
        let db = open_handle(name, flags, self.config.busy_timeout)
            .map_err(|(_, message)| cannot_open(name, &message))?;

        // Opening is lazy; reading the schema proves the file is a database.
        if let Err(e) = health_check(
            db,
            "SELECT count(*) FROM sqlite_master",
            self.config.connect_timeout,
        ) {
            close_handle(db);
            return Err(cannot_open(name, &e.to_string()));
        }

        close_handle(std::mem::replace(&mut self.db, db));
        tracing::info!(from = %self.path, to = %name, "Switched database");
        self.path = name.to_string();
        Ok(())
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        close_handle(self.db);
    }
}

impl Connection for SqliteConnection {
    type Cursor<'conn>
        = SqliteCursor<'conn>
    where
        Self: 'conn;

    fn query(
        &mut self,
        cx: &Cx,
        sql: &str,
        timeout: Duration,
    ) -> impl Future<Output = Outcome<Self::Cursor<'_>, Error>> + Send {
        let outcome = match cx.cancel_reason() {
            Some(reason) => Outcome::Cancelled(reason),
            None => self
                .query_sync(sql, timeout)
                .map_or_else(Outcome::Err, Outcome::Ok),
        };
        async move { outcome }
    }

    fn execute(
        &mut self,
        cx: &Cx,
        sql: &str,
        timeout: Duration,
    ) -> impl Future<Output = Outcome<u64, Error>> + Send {
        let outcome = match cx.cancel_reason() {
            Some(reason) => Outcome::Cancelled(reason),
            None => self
                .execute_sync(sql, timeout)
                .map_or_else(Outcome::Err, Outcome::Ok),
        };
        async move { outcome }
    }

    fn ping(&mut self, _cx: &Cx) -> impl Future<Output = Outcome<(), Error>> + Send {
        let result = health_check(self.db, "SELECT 1", self.config.connect_timeout);
        async move { result.map_or_else(Outcome::Err, Outcome::Ok) }
    }

    fn server_info(
        &mut self,
        _cx: &Cx,
    ) -> impl Future<Output = Outcome<ServerInfo, Error>> + Send {
        let info = ServerInfo {
            product: PRODUCT.to_string(),
            version: crate::sqlite_version().to_string(),
        };
        async move { Outcome::Ok(info) }
    }

    fn use_database(
        &mut self,
        _cx: &Cx,
        name: &str,
    ) -> impl Future<Output = Outcome<(), Error>> + Send {
        let result = self.use_database_sync(name);
        async move { result.map_or_else(Outcome::Err, Outcome::Ok) }
    }

    fn close(self, _cx: &Cx) -> impl Future<Output = Result<()>> + Send {
        tracing::debug!(database = %self.path, "Closing SQLite connection");
        drop(self);
        async { Ok(()) }
    }
}

// Helper functions

fn to_cstring(sql: &str) -> Result<CString> {
    CString::new(sql).map_err(|_| {
        Error::Query(QueryError {
            kind: QueryErrorKind::Syntax,
            sql: Some(sql.to_string()),
            message: "SQL contains null byte".to_string(),
        })
    })
}

fn open_handle(
    path: &str,
    flags: c_int,
    busy_timeout: Duration,
) -> std::result::Result<*mut ffi::sqlite3, (c_int, String)> {
    let c_path = CString::new(path)
        .map_err(|_| (ffi::SQLITE_MISUSE, "Invalid path: contains null byte".to_string()))?;

    let mut db: *mut ffi::sqlite3 = ptr::null_mut();
    // SAFETY: valid pointers; the return code is checked
    let rc = unsafe { ffi::sqlite3_open_v2(c_path.as_ptr(), &mut db, flags, ptr::null()) };

    if rc != ffi::SQLITE_OK {
        let message = if db.is_null() {
            errstr(rc)
        } else {
            let message = errmsg(db);
            close_handle(db);
            message
        };
        return Err((rc, message));
    }

    let busy_ms = c_int::try_from(busy_timeout.as_millis()).unwrap_or(c_int::MAX);
    // SAFETY: db is open
    unsafe { ffi::sqlite3_busy_timeout(db, busy_ms) };
    Ok(db)
}

fn close_handle(db: *mut ffi::sqlite3) {
    if !db.is_null() {
        // SAFETY: db is open and closed once; close_v2 defers if statements remain
        unsafe { sqlite3_close_v2(db) };
    }
}

/// Prepare the statement starting at byte `offset` of `c_sql`. Returns the
/// statement and the offset just past it.
fn prepare(
    db: *mut ffi::sqlite3,
    c_sql: &CStr,
    offset: usize,
    sql: &str,
    deadline: &Deadline,
) -> Result<(Statement, usize)> {
    let base = c_sql.as_ptr();
    let len = c_sql.to_bytes().len() - offset;
    let mut raw: *mut ffi::sqlite3_stmt = ptr::null_mut();
    let mut tail: *const c_char = ptr::null();

    // SAFETY: base + offset stays inside the NUL-terminated buffer
    let rc = unsafe {
        ffi::sqlite3_prepare_v2(
            db,
            base.add(offset),
            c_int::try_from(len).unwrap_or(c_int::MAX),
            &mut raw,
            &mut tail,
        )
    };
    let stmt = Statement::new(raw);
    if rc != ffi::SQLITE_OK {
        return Err(step_failure(db, sql, rc, deadline));
    }

    let next = if tail.is_null() {
        offset + len
    } else {
        // SAFETY: tail points into the same buffer as base
        unsafe { tail.offset_from(base) as usize }
    };
    Ok((stmt, next))
}

/// Run `sql` and require it to produce a row or finish cleanly.
fn health_check(db: *mut ffi::sqlite3, sql: &str, timeout: Duration) -> Result<()> {
    let deadline = Deadline::start(db, timeout);
    let c_sql = to_cstring(sql)?;
    let (stmt, _) = prepare(db, &c_sql, 0, sql, &deadline)?;
    // SAFETY: stmt is a valid prepared statement
    match unsafe { ffi::sqlite3_step(stmt.raw()) } {
        ffi::SQLITE_ROW | ffi::SQLITE_DONE => Ok(()),
        rc => Err(step_failure(db, sql, rc, &deadline)),
    }
}

/// Turn a failed prepare/step into an error, reporting a timeout when the
/// deadline interrupted the statement.
pub(crate) fn step_failure(
    db: *mut ffi::sqlite3,
    sql: &str,
    rc: c_int,
    deadline: &Deadline,
) -> Error {
    if rc & 0xff == ffi::SQLITE_INTERRUPT && deadline.expired() {
        tracing::warn!(
            timeout_ms = deadline.timeout().as_millis() as u64,
            "Statement interrupted by deadline"
        );
        return Error::Timeout {
            after: deadline.timeout(),
        };
    }

    let message = errmsg(db);
    Error::Query(QueryError {
        kind: error_code_to_kind(rc, &message),
        sql: Some(sql.to_string()),
        message,
    })
}

fn cannot_open(name: &str, message: &str) -> Error {
    Error::Query(QueryError {
        kind: QueryErrorKind::NotFound,
        sql: None,
        message: format!("Cannot open database '{}': {}", name, message),
    })
}

fn errmsg(db: *mut ffi::sqlite3) -> String {
    // SAFETY: db is open; errmsg returns a valid C string
    unsafe { CStr::from_ptr(ffi::sqlite3_errmsg(db)) }
        .to_string_lossy()
        .into_owned()
}

fn errstr(rc: c_int) -> String {
    // SAFETY: errstr returns a static C string for any code
    unsafe { CStr::from_ptr(ffi::sqlite3_errstr(rc)) }
        .to_string_lossy()
        .into_owned()
}

fn error_code_to_kind(code: c_int, message: &str) -> QueryErrorKind {
    match code & 0xff {
        ffi::SQLITE_CONSTRAINT => QueryErrorKind::Constraint,
        ffi::SQLITE_BUSY | ffi::SQLITE_LOCKED => QueryErrorKind::Busy,
        ffi::SQLITE_PERM | ffi::SQLITE_AUTH | ffi::SQLITE_READONLY => QueryErrorKind::Permission,
        ffi::SQLITE_NOTFOUND => QueryErrorKind::NotFound,
        ffi::SQLITE_TOOBIG => QueryErrorKind::DataTruncation,
        ffi::SQLITE_INTERRUPT => QueryErrorKind::Cancelled,
        ffi::SQLITE_ERROR if message.contains("syntax error") => QueryErrorKind::Syntax,
        ffi::SQLITE_ERROR if message.starts_with("no such") => QueryErrorKind::NotFound,
        _ => QueryErrorKind::Database,
    }
}
