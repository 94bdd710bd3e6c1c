//! Batch accumulation: turning input lines into one statement.
//!
//! A batch ends at a line that is just `GO` (any case), which is dropped, or
//! at a line whose trimmed text ends with `;`. Lines in between are kept
//! verbatim, joined with newlines, and the result is trimmed with one
//! trailing `;` removed.

use crate::line_source::{LineEvent, LineSource};

/// Batch separator keyword, matched case-insensitively on its own line.
pub const BATCH_SEPARATOR: &str = "GO";

/// Statement terminator.
pub const TERMINATOR: char = ';';

/// Prompt shown while a batch is still open.
pub const CONTINUATION_PROMPT: &str = "  -> ";

/// The result of one accumulation round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Batch {
    /// A complete, non-empty statement.
    Statement(String),
    /// Nothing to run: a blank first line, an interrupt, or a batch with no
    /// text. The caller prompts again.
    Empty,
    /// The line source is exhausted. Any partial batch is discarded.
    EndOfInput,
}

/// Read lines from `source` until a batch is complete.
///
/// `prompt` is shown for the first line; later lines get
/// [`CONTINUATION_PROMPT`]. An interrupt on the first line yields
/// [`Batch::Empty`]; an interrupt later adds nothing and keeps reading.
pub fn accumulate<S: LineSource + ?Sized>(source: &mut S, prompt: &str) -> Batch {
    let mut lines: Vec<String> = Vec::new();

    loop {
        let shown = if lines.is_empty() {
            prompt
        } else {
            CONTINUATION_PROMPT
        };

        let line = match source.read_line(shown) {
            LineEvent::Line(line) => line,
            LineEvent::Interrupted if lines.is_empty() => return Batch::Empty,
            LineEvent::Interrupted => continue,
            LineEvent::Eof => {
                if !lines.is_empty() {
                    tracing::debug!(lines = lines.len(), "Input ended inside a batch");
                }
                return Batch::EndOfInput;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() && lines.is_empty() {
            return Batch::Empty;
        }
        if trimmed.eq_ignore_ascii_case(BATCH_SEPARATOR) {
            break;
        }
        let terminated = trimmed.ends_with(TERMINATOR);
        lines.push(line);
        if terminated {
            break;
        }
    }

    finish(&lines)
}

fn finish(lines: &[String]) -> Batch {
    let joined = lines.join("\n");
    let trimmed = joined.trim();
    let statement = trimmed.strip_suffix(TERMINATOR).unwrap_or(trimmed).trim_end();
    if statement.is_empty() {
        Batch::Empty
    } else {
        Batch::Statement(statement.to_string())
    }
}
