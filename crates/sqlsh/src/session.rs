//! The interactive session loop.
//!
//! A [`Shell`] owns the connection, the line source and the output console,
//! plus a [`Session`] holding the state meta-commands change. Each
//! [`Shell::step`] prompts once, reads a batch, and either applies a
//! meta-command or runs the statement and prints its result.
//!
//! # Example
//!
//! ```rust,ignore
//! let session = Session::new("app.db", 1000);
//! let mut shell = Shell::new(conn, ScriptLineSource::new(["SELECT 1;"]), ShellConsole::stdout(), session);
//! shell.run(&cx).await?;
//! ```

use crate::batch::{Batch, accumulate};
use crate::classify::{Command, MetaCommand, classify};
use crate::executor::{Execution, Executor};
use crate::help::HELP_TEXT;
use crate::line_source::LineSource;
use sqlsh_console::{ShellConsole, Summary, TableRenderer};
use sqlsh_core::{Connection, Cx, Error, Outcome, Result};
use std::io::Write;
use std::time::{Duration, Instant};

/// State that lives for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    database: String,
    timing: bool,
    max_rows: usize,
}

impl Session {
    pub fn new(database: impl Into<String>, max_rows: usize) -> Self {
        Self {
            database: database.into(),
            timing: false,
            max_rows,
        }
    }

    /// Start with timing reports on or off.
    pub fn timing(mut self, enabled: bool) -> Self {
        self.timing = enabled;
        self
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn timing_enabled(&self) -> bool {
        self.timing
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Prompt for the first line of a batch.
    pub fn prompt(&self) -> String {
        format!("{}> ", self.database)
    }

    /// Flip the timing flag and return the new value.
    pub fn toggle_timing(&mut self) -> bool {
        self.timing = !self.timing;
        self.timing
    }

    pub fn set_database(&mut self, database: impl Into<String>) {
        self.database = database.into();
    }
}

/// Whether the loop keeps going after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Reads, classifies and runs statements until exit or end of input.
pub struct Shell<C, S, W: Write> {
    conn: C,
    source: S,
    console: ShellConsole<W>,
    session: Session,
    executor: Executor,
    renderer: TableRenderer,
}

impl<C, S, W> Shell<C, S, W>
where
    C: Connection,
    S: LineSource,
    W: Write,
{
    pub fn new(conn: C, source: S, console: ShellConsole<W>, session: Session) -> Self {
        let renderer = TableRenderer::new(session.max_rows());
        Self {
            conn,
            source,
            console,
            session,
            executor: Executor::default(),
            renderer,
        }
    }

    /// Use `timeout` as the per-statement deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.executor = Executor::new(timeout);
        self
    }

    /// Take the shell apart.
    pub fn into_parts(self) -> (C, S, ShellConsole<W>, Session) {
        (self.conn, self.source, self.console, self.session)
    }

    /// Run until `exit`/`quit` or end of input.
    ///
    /// Statement failures are printed and the loop goes on. Only a failure
    /// to write to the output sink ends it with an error.
    pub async fn run(&mut self, cx: &Cx) -> Result<()> {
        tracing::info!(database = %self.session.database(), "Session started");
        let result = loop {
            match self.step(cx).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.source.finish();
        tracing::info!("Session ended");
        result
    }

    /// Prompt once and handle one batch.
    pub async fn step(&mut self, cx: &Cx) -> Result<Flow> {
        let prompt = self.session.prompt();
        let statement = match accumulate(&mut self.source, &prompt) {
            Batch::Statement(statement) => statement,
            Batch::Empty => return Ok(Flow::Continue),
            Batch::EndOfInput => {
                tracing::debug!("End of input");
                return self.apply_meta(cx, MetaCommand::Exit).await;
            }
        };

        let statement = statement.trim();
        match classify(statement) {
            Command::Meta(meta) => self.apply_meta(cx, meta).await,
            command => {
                self.run_statement(cx, statement, &command).await?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn apply_meta(&mut self, cx: &Cx, meta: MetaCommand) -> Result<Flow> {
        tracing::debug!(command = ?meta, "Meta command");
        match meta {
            MetaCommand::Exit => {
                self.console.newline()?;
                return Ok(Flow::Exit);
            }
            MetaCommand::Help => self.console.print(HELP_TEXT)?,
            MetaCommand::Timing => {
                if self.session.toggle_timing() {
                    self.console.println("Timing enabled")?;
                } else {
                    self.console.println("Timing disabled")?;
                }
            }
            MetaCommand::Clear => self.console.clear_screen()?,
            MetaCommand::Use(Some(name)) => self.use_database(cx, name).await?,
            MetaCommand::Use(None) => {}
        }
        Ok(Flow::Continue)
    }

    async fn use_database(&mut self, cx: &Cx, name: String) -> Result<()> {
        let failure = match self.conn.use_database(cx, &name).await {
            Outcome::Ok(()) => None,
            Outcome::Err(e) => Some(e.to_string()),
            Outcome::Cancelled(_) => Some(Error::Cancelled.to_string()),
            Outcome::Panicked(p) => Some(format!("Driver panicked: {:?}", p)),
        };

        match failure {
            None => {
                tracing::info!(from = %self.session.database(), to = %name, "Switched database");
                self.console
                    .println(&format!("Changed database context to '{}'.", name))?;
                self.session.set_database(name);
            }
            Some(message) => {
                tracing::debug!(database = %name, error = %message, "Database switch failed");
                self.console.println(&format!("Error: {}", message))?;
            }
        }
        Ok(())
    }

    async fn run_statement(&mut self, cx: &Cx, sql: &str, command: &Command) -> Result<()> {
        let started = Instant::now();
        let timing = self.session.timing_enabled();

        match self.executor.run(cx, &mut self.conn, sql, command).await {
            Execution::Rows(cursor) => {
                match self
                    .console
                    .print_result_set(&self.renderer, cursor, started, timing)
                {
                    Ok(rows) => {
                        tracing::debug!(rows, elapsed = ?started.elapsed(), "Query finished");
                    }
                    Err(Error::Io(e)) => return Err(Error::Io(e)),
                    Err(e) => {
                        tracing::debug!(error = %e, "Fetch failed");
                        self.console.print_failure(&e.to_string())?;
                    }
                }
            }
            Execution::Affected(count) => {
                tracing::debug!(affected = count, elapsed = ?started.elapsed(), "Statement finished");
                let mut summary = Summary::new(count);
                if timing {
                    summary = summary.elapsed(started.elapsed());
                }
                self.console.print_summary(&summary)?;
            }
            Execution::Failure(message) => self.console.print_failure(&message)?,
        }
        Ok(())
    }
}
