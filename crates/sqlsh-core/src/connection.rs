//! Database collaborator traits.
//!
//! - [`Connection`] - executes statement text and switches databases
//! - [`RowCursor`] - a lazily fetched result set with its column metadata
//! - [`ConnectionConfig`] - how to open a connection
//!
//! Every operation takes an asupersync `Cx` and resolves to an [`Outcome`],
//! so callers can tell database errors apart from cancellation and panics.

use crate::error::{Error, Result};
use crate::row::{ColumnInfo, Row};
use asupersync::{Cx, Outcome};
use std::sync::Arc;
use std::time::Duration;

/// A result set being streamed from the database.
///
/// Rows are fetched one at a time as the iterator is advanced. Column
/// metadata is available before the first row. Dropping the cursor releases
/// the server-side statement, whether or not it was read to the end.
pub trait RowCursor: Iterator<Item = Result<Row>> {
    /// Column names and declared types, in result order.
    fn columns(&self) -> &Arc<ColumnInfo>;
}

/// Product and version reported by the connected database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub product: String,
    pub version: String,
}

/// A database connection.
///
/// One statement is in flight at a time: `query` borrows the connection
/// mutably for as long as its cursor lives.
///
/// # Example
///
/// ```rust,ignore
/// let cursor = match conn.query(&cx, "SELECT * FROM t", Duration::from_secs(60)).await {
///     Outcome::Ok(cursor) => cursor,
///     Outcome::Err(e) => return Err(e),
///     _ => return Err(Error::Cancelled),
/// };
/// for row in cursor.take(1000) {
///     let row = row?;
/// }
/// ```
pub trait Connection: Send {
    /// The cursor type returned by `query`.
    type Cursor<'conn>: RowCursor + Send
    where
        Self: 'conn;

    /// Run a row-returning statement. Column metadata is resolved before the
    /// cursor is returned; rows are fetched lazily. The timeout covers the
    /// whole statement, including row fetches through the cursor.
    fn query(
        &mut self,
        cx: &Cx,
        sql: &str,
        timeout: Duration,
    ) -> impl Future<Output = Outcome<Self::Cursor<'_>, Error>> + Send;

    /// Run a statement to completion and return the number of rows it changed.
    fn execute(
        &mut self,
        cx: &Cx,
        sql: &str,
        timeout: Duration,
    ) -> impl Future<Output = Outcome<u64, Error>> + Send;

    /// Check the connection with a trivial round trip.
    fn ping(&mut self, cx: &Cx) -> impl Future<Output = Outcome<(), Error>> + Send;

    /// Report the server product and version.
    fn server_info(&mut self, cx: &Cx) -> impl Future<Output = Outcome<ServerInfo, Error>> + Send;

    /// Switch the connection to another database. On failure the current
    /// database stays selected.
    fn use_database(
        &mut self,
        cx: &Cx,
        name: &str,
    ) -> impl Future<Output = Outcome<(), Error>> + Send;

    /// Check if the connection is still valid (ping that returns bool).
    fn is_valid(&mut self, cx: &Cx) -> impl Future<Output = bool> + Send {
        async {
            match self.ping(cx).await {
                Outcome::Ok(()) => true,
                Outcome::Err(_) | Outcome::Cancelled(_) | Outcome::Panicked(_) => false,
            }
        }
    }

    /// Close the connection gracefully.
    fn close(self, cx: &Cx) -> impl Future<Output = Result<()>> + Send;
}

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Database to open (a file path, or `:memory:`)
    pub database: String,
    /// Deadline for opening the connection and its health check
    pub connect_timeout: Duration,
    /// How long to wait on a locked database before failing
    pub busy_timeout: Duration,
    /// Deadline for each statement
    pub query_timeout: Duration,
    /// Open without write access
    pub read_only: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            database: ":memory:".to_string(),
            connect_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(5),
            query_timeout: Duration::from_secs(60),
            read_only: false,
        }
    }
}

impl ConnectionConfig {
    /// Create a config for the given database.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Default::default()
        }
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the busy (lock wait) timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Set the per-statement timeout.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Reject settings no connection could honor.
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(Error::config("database must not be empty"));
        }
        if self.query_timeout.is_zero() {
            return Err(Error::config("query timeout must be greater than zero"));
        }
        if self.connect_timeout.is_zero() {
            return Err(Error::config("connect timeout must be greater than zero"));
        }
        Ok(())
    }
}
