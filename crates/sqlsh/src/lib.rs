//! sqlsh - an interactive SQL batch shell.
//!
//! Input lines are collected into batches (ended by `GO` or a trailing `;`),
//! classified as meta-commands, queries or other statements, and run against
//! a [`sqlsh_core::Connection`]. Query results are printed as aligned tables
//! capped at a fixed number of rows; other statements report their
//! affected-row count.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlsh::{ScriptLineSource, Session, Shell};
//! use sqlsh_console::ShellConsole;
//!
//! let source = ScriptLineSource::new(["CREATE TABLE t (x INTEGER);", "SELECT * FROM t", "GO"]);
//! let mut shell = Shell::new(conn, source, ShellConsole::stdout(), Session::new(":memory:", 1000));
//! shell.run(&cx).await?;
//! ```

pub mod batch;
pub mod classify;
pub mod config;
pub mod executor;
pub mod help;
pub mod line_source;
pub mod logging;
pub mod session;

pub use batch::{Batch, accumulate};
pub use classify::{Command, MetaCommand, classify};
pub use config::{Args, ShellConfig};
pub use executor::{Execution, Executor};
pub use line_source::{EditorLineSource, LineEvent, LineSource, ScriptLineSource};
pub use session::{Flow, Session, Shell};
