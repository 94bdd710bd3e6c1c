//! Failure diagnostics.

/// A statement failure as shown to the user: a fixed header line, the raw
/// database message, then a blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
}

impl Diagnostic {
    /// Header printed above every failure message.
    pub const HEADER: &'static str = "Msg 50000, Level 16, State 1";

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn render_plain(&self) -> String {
        format!("{}\n{}\n\n", Self::HEADER, self.message)
    }
}
