//! Statement classification.
//!
//! Decides from leading text alone whether a statement is a shell
//! meta-command, a statement that returns rows, or one that only changes
//! data. Nothing here parses SQL.

/// Session-control commands handled by the shell itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    /// `exit` or `quit`
    Exit,
    Help,
    /// Toggle elapsed-time reporting.
    Timing,
    /// `clear` or `cls`
    Clear,
    /// `use <name>`. `None` when no name followed the keyword.
    Use(Option<String>),
}

/// How a statement is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Meta(MetaCommand),
    /// Returns rows; executed as a query and rendered as a table.
    Query,
    /// Executed for its affected-row count.
    NonQuery,
}

impl Command {
    pub fn is_query(&self) -> bool {
        matches!(self, Command::Query)
    }
}

/// Leading text of statements that return rows, compared upper-cased.
pub const QUERY_PREFIXES: &[&str] = &[
    "SELECT",
    "SHOW",
    "WITH",
    "EXPLAIN",
    "VALUES",
    "PRAGMA",
    "EXEC SP_HELP",
    "EXEC SP_DATABASES",
    "EXEC SP_TABLES",
    "EXEC SP_COLUMNS",
    "EXEC SP_WHO",
];

/// Classify a complete statement.
pub fn classify(statement: &str) -> Command {
    let statement = statement.trim();
    match meta_command(statement) {
        Some(meta) => Command::Meta(meta),
        None if is_query(statement) => Command::Query,
        None => Command::NonQuery,
    }
}

fn meta_command(statement: &str) -> Option<MetaCommand> {
    let lower = statement.to_ascii_lowercase();
    match lower.as_str() {
        "exit" | "quit" => return Some(MetaCommand::Exit),
        "help" => return Some(MetaCommand::Help),
        "timing" => return Some(MetaCommand::Timing),
        "clear" | "cls" => return Some(MetaCommand::Clear),
        _ => {}
    }

    let mut tokens = statement.split_whitespace();
    match tokens.next() {
        Some(first) if first.eq_ignore_ascii_case("use") => {
            Some(MetaCommand::Use(tokens.next().map(str::to_string)))
        }
        _ => None,
    }
}

/// Does the statement start with a row-returning keyword?
pub fn is_query(statement: &str) -> bool {
    let upper = statement.trim_start().to_ascii_uppercase();
    QUERY_PREFIXES.iter().any(|prefix| upper.starts_with(prefix))
}
