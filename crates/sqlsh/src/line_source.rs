//! Where input lines come from.
//!
//! The shell reads through the [`LineSource`] trait so the same batching and
//! session logic drives an interactive line editor, a script file, or a
//! canned list of lines in tests.

use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use sqlsh_core::{Error, Result};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// One read from a line source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A line of text, without its newline.
    Line(String),
    /// The user interrupted the read (Ctrl-C). No text was entered.
    Interrupted,
    /// Input is exhausted (Ctrl-D, end of file, or an unreadable terminal).
    Eof,
}

/// A source of logical input lines.
pub trait LineSource {
    /// Read the next line, showing `prompt` if the source is interactive.
    fn read_line(&mut self, prompt: &str) -> LineEvent;

    /// Called once when the session ends.
    fn finish(&mut self) {}
}

impl<S: LineSource + ?Sized> LineSource for &mut S {
    fn read_line(&mut self, prompt: &str) -> LineEvent {
        (**self).read_line(prompt)
    }

    fn finish(&mut self) {
        (**self).finish();
    }
}

// ============================================================================
// Interactive editor
// ============================================================================

/// Interactive terminal input with line editing and history.
pub struct EditorLineSource {
    editor: DefaultEditor,
    history: Option<PathBuf>,
}

impl EditorLineSource {
    /// Start a line editor, loading history from `history` when it exists.
    pub fn open(history: Option<PathBuf>) -> Result<Self> {
        let config = Config::builder().auto_add_history(false).build();
        let mut editor = DefaultEditor::with_config(config).map_err(editor_error)?;

        if let Some(path) = &history {
            match editor.load_history(path) {
                Ok(()) => tracing::debug!(path = %path.display(), "Loaded history"),
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "No history loaded"),
            }
        }

        Ok(Self { editor, history })
    }
}

impl LineSource for EditorLineSource {
    fn read_line(&mut self, prompt: &str) -> LineEvent {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        tracing::debug!(error = %e, "Failed to record history entry");
                    }
                }
                LineEvent::Line(line)
            }
            Err(ReadlineError::Interrupted) => LineEvent::Interrupted,
            Err(ReadlineError::Eof) => LineEvent::Eof,
            Err(e) => {
                tracing::warn!(error = %e, "Line editor failed; ending input");
                LineEvent::Eof
            }
        }
    }

    fn finish(&mut self) {
        if let Some(path) = &self.history {
            if let Err(e) = self.editor.save_history(path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to save history");
            }
        }
    }
}

fn editor_error(err: ReadlineError) -> Error {
    match err {
        ReadlineError::Io(e) => Error::Io(e),
        other => Error::Custom(format!("Line editor unavailable: {}", other)),
    }
}

// ============================================================================
// Scripted input
// ============================================================================

/// Lines fed from memory or a file, with no terminal interaction.
///
/// Prompts are not written anywhere; they are kept so callers can see what
/// the shell would have shown.
#[derive(Debug, Default)]
pub struct ScriptLineSource {
    events: VecDeque<LineEvent>,
    prompts: Vec<String>,
}

impl ScriptLineSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_events(lines.into_iter().map(|l| LineEvent::Line(l.into())))
    }

    /// Replay a fixed sequence of events, then report end of input.
    pub fn from_events<I: IntoIterator<Item = LineEvent>>(events: I) -> Self {
        Self {
            events: events.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        Ok(Self::new(lines))
    }

    /// Read a whole script file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            Error::config(format!("cannot read input file {}: {}", path.display(), e))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Prompts requested so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl LineSource for ScriptLineSource {
    fn read_line(&mut self, prompt: &str) -> LineEvent {
        self.prompts.push(prompt.to_string());
        self.events.pop_front().unwrap_or(LineEvent::Eof)
    }
}
