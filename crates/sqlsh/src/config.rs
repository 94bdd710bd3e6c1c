//! Command line and environment configuration.

use clap::Parser;
use sqlsh_console::renderables::DEFAULT_MAX_ROWS;
use sqlsh_core::{ConnectionConfig, Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Interactive SQL shell for SQLite databases.
///
/// Statements run when a line ends with `;` or when `GO` is entered on a
/// line of its own.
#[derive(Parser, Debug, Clone)]
#[command(name = "sqlsh", version)]
pub struct Args {
    /// Database file to open (`:memory:` for a temporary database)
    #[arg(env = "SQLSH_DATABASE", default_value = ":memory:")]
    pub database: String,

    /// Maximum number of rows shown per result
    #[arg(long, env = "SQLSH_MAX_ROWS", default_value_t = DEFAULT_MAX_ROWS)]
    pub max_rows: usize,

    /// Statement timeout in seconds
    #[arg(long, env = "SQLSH_TIMEOUT", default_value_t = 60)]
    pub timeout: u64,

    /// Report elapsed time after every statement
    #[arg(long, env = "SQLSH_TIMING")]
    pub timing: bool,

    /// File to load and save line history
    #[arg(long, env = "SQLSH_HISTORY", value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// Read statements from a file instead of the terminal
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Open the database read-only
    #[arg(long)]
    pub read_only: bool,

    /// Do not print the welcome banner
    #[arg(long)]
    pub no_banner: bool,
}

/// Validated shell settings.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub connection: ConnectionConfig,
    pub max_rows: usize,
    pub timing: bool,
    pub history: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub banner: bool,
}

impl ShellConfig {
    pub fn from_args(args: Args) -> Result<Self> {
        if args.max_rows == 0 {
            return Err(Error::config("--max-rows must be at least 1"));
        }
        if args.timeout == 0 {
            return Err(Error::config("--timeout must be at least 1 second"));
        }

        let connection = ConnectionConfig::new(args.database)
            .query_timeout(Duration::from_secs(args.timeout))
            .read_only(args.read_only);
        connection.validate()?;

        Ok(Self {
            connection,
            max_rows: args.max_rows,
            timing: args.timing,
            history: args.history,
            input: args.input,
            banner: !args.no_banner,
        })
    }

    pub fn query_timeout(&self) -> Duration {
        self.connection.query_timeout
    }

    pub fn database(&self) -> &str {
        &self.connection.database
    }

    /// Is the shell reading from the terminal rather than a script?
    pub fn interactive(&self) -> bool {
        self.input.is_none()
    }
}
