//! SQLite database collaborator for sqlsh.
//!
// FFI calls require unsafe code - expected for a database driver
#![allow(unsafe_code)]
//!
//! Implements the `Connection` trait from sqlsh-core over the SQLite C API,
//! linked from the bundled amalgamation in `libsqlite3-sys`.
//!
//! # Features
//!
//! - Streaming cursors: rows are stepped only as the caller pulls them
//! - Column names and declared types available before the first row
//! - Per-statement deadlines via the progress handler
//! - `DATE` / `DATETIME` / `TIMESTAMP` text surfaced as temporal values
//! - Switching databases by reopening the handle
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlsh_sqlite::SqliteConnection;
//! use sqlsh_core::{Connection, ConnectionConfig, Cx, Outcome};
//! use std::time::Duration;
//!
//! let mut conn = SqliteConnection::open(&ConnectionConfig::new("app.db"))?;
//! let cx = Cx::for_testing();
//! match conn.execute(&cx, "DELETE FROM sessions", Duration::from_secs(60)).await {
//!     Outcome::Ok(n) => println!("({} rows affected)", n),
//!     Outcome::Err(e) => eprintln!("{}", e),
//!     _ => {}
//! }
//! ```
//!
//! # Type Mapping
//!
//! | SQLite storage | Value |
//! |----------------|-------|
//! | NULL | `Null` |
//! | INTEGER | `Int` when it fits in 32 bits, else `BigInt` |
//! | REAL | `Double` |
//! | TEXT | `Text`, or `Date` / `Timestamp` in temporal columns |
//! | BLOB | `Bytes` |

pub mod connection;
pub mod cursor;
mod statement;
pub mod types;

pub use connection::SqliteConnection;
pub use cursor::SqliteCursor;

use std::ffi::CStr;

/// The linked SQLite library version.
pub fn sqlite_version() -> &'static str {
    // SAFETY: sqlite3_libversion returns a static NUL-terminated string
    unsafe { CStr::from_ptr(libsqlite3_sys::sqlite3_libversion()) }
        .to_str()
        .unwrap_or("unknown")
}
