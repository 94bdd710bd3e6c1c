//! sqlsh console - text output for the interactive shell.
//!
//! Everything the shell shows the user goes through a [`ShellConsole`]:
//! prompts echoed by scripted input, result tables, row-count summaries,
//! meta-command feedback and failure diagnostics. The console writes to any
//! `std::io::Write` sink and flushes after every write, so output order
//! always matches emission order.
//!
//! # Example
//!
//! ```rust
//! use sqlsh_console::renderables::Summary;
//! use sqlsh_console::ShellConsole;
//!
//! let mut console = ShellConsole::new(Vec::new());
//! console.print_summary(&Summary::new(3)).unwrap();
//! assert_eq!(console.into_inner(), b"(3 rows affected)\n\n");
//! ```

#![forbid(unsafe_code)]

pub mod console;
pub mod renderables;

pub use console::ShellConsole;
pub use renderables::{Cell, Diagnostic, RenderedTable, Summary, TableRenderer};
