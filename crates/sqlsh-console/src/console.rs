//! ShellConsole - the shell's output sink.
//!
//! All user-visible output (tables, summaries, feedback for meta commands,
//! failure diagnostics) is written through one `ShellConsole`. Each call
//! writes its text in full and flushes, so nothing is held back in a buffer
//! while the shell waits for input.
//!
//! # Example
//!
//! ```rust
//! use sqlsh_console::ShellConsole;
//!
//! let mut console = ShellConsole::new(Vec::new());
//! console.println("Timing enabled").unwrap();
//! console.print_failure("no such table: t").unwrap();
//! assert_eq!(
//!     String::from_utf8(console.into_inner()).unwrap(),
//!     "Timing enabled\nMsg 50000, Level 16, State 1\nno such table: t\n\n"
//! );
//! ```

use crate::renderables::{Diagnostic, RenderedTable, Summary, TableRenderer};
use sqlsh_core::RowCursor;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

/// Escape sequence that clears the screen and homes the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Output sink for the interactive shell.
#[derive(Debug)]
pub struct ShellConsole<W: Write> {
    out: W,
}

impl ShellConsole<io::Stdout> {
    /// Console writing to the process's stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ShellConsole<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    // =========================================================================
    // Basic Output Methods
    // =========================================================================

    /// Write `text` as is and flush.
    pub fn print(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    /// Write `text` followed by a newline.
    pub fn println(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }

    pub fn newline(&mut self) -> io::Result<()> {
        self.print("\n")
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        self.print(CLEAR_SCREEN)
    }

    // =========================================================================
    // Renderables
    // =========================================================================

    pub fn print_table(&mut self, table: &RenderedTable) -> io::Result<()> {
        self.print(&table.render_plain())
    }

    pub fn print_summary(&mut self, summary: &Summary) -> io::Result<()> {
        self.print(&summary.render_plain())
    }

    /// Print a statement failure under the fixed diagnostic header.
    pub fn print_failure(&mut self, message: &str) -> io::Result<()> {
        self.print(&Diagnostic::new(message).render_plain())
    }

    /// Render a result set: table, row count, and elapsed time since
    /// `started` when `timing` is set.
    ///
    /// The cursor is consumed and dropped before this returns, on success and
    /// on failure alike. Nothing is printed if a row fetch fails.
    pub fn print_result_set<C: RowCursor>(
        &mut self,
        renderer: &TableRenderer,
        cursor: C,
        started: Instant,
        timing: bool,
    ) -> sqlsh_core::Result<usize> {
        let columns = Arc::clone(cursor.columns());
        let table = renderer.render(&columns, cursor)?;
        self.print_table(&table)?;

        let mut summary = Summary::new(table.row_count() as u64);
        if timing {
            summary = summary.elapsed(started.elapsed());
        }
        self.print_summary(&summary)?;
        Ok(table.row_count())
    }

    // =========================================================================
    // Sink access
    // =========================================================================

    pub fn into_inner(self) -> W {
        self.out
    }
}
