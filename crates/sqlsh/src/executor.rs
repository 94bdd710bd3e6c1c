//! Statement execution against a database connection.

use crate::classify::Command;
use sqlsh_core::{Connection, Cx, Error, Outcome};
use std::time::Duration;

/// Deadline for each statement, measured from submission.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// What running one statement produced.
#[derive(Debug)]
pub enum Execution<C> {
    /// A result set, with column metadata already resolved.
    Rows(C),
    /// The driver-reported number of changed rows.
    Affected(u64),
    /// The raw error text, shown to the user as is.
    Failure(String),
}

/// Runs statements with a fixed per-statement deadline.
#[derive(Debug, Clone, Copy)]
pub struct Executor {
    timeout: Duration,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Executor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `sql` as a query when `command` is [`Command::Query`], otherwise
    /// for its affected-row count.
    ///
    /// Every failure, including a passed deadline, cancellation or a panic in
    /// the driver, comes back as [`Execution::Failure`].
    pub async fn run<'c, C>(
        &self,
        cx: &Cx,
        conn: &'c mut C,
        sql: &str,
        command: &Command,
    ) -> Execution<C::Cursor<'c>>
    where
        C: Connection + 'c,
    {
        if command.is_query() {
            tracing::debug!(timeout = ?self.timeout, "Running query");
            match failure_text(conn.query(cx, sql, self.timeout).await) {
                Ok(cursor) => Execution::Rows(cursor),
                Err(message) => Execution::Failure(message),
            }
        } else {
            tracing::debug!(timeout = ?self.timeout, "Running statement");
            match failure_text(conn.execute(cx, sql, self.timeout).await) {
                Ok(count) => Execution::Affected(count),
                Err(message) => Execution::Failure(message),
            }
        }
    }
}

fn failure_text<T>(outcome: Outcome<T, Error>) -> Result<T, String> {
    match outcome {
        Outcome::Ok(value) => Ok(value),
        Outcome::Err(e) => {
            tracing::debug!(error = %e, timeout = e.is_timeout(), "Statement failed");
            Err(e.to_string())
        }
        Outcome::Cancelled(reason) => {
            tracing::info!(reason = ?reason, "Statement cancelled");
            Err(Error::Cancelled.to_string())
        }
        Outcome::Panicked(payload) => {
            tracing::warn!(payload = ?payload, "Driver panicked");
            Err(format!("Driver panicked: {:?}", payload))
        }
    }
}
