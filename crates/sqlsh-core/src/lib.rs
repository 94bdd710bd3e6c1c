//! Core types and traits for sqlsh.
//!
//! This crate provides the abstractions shared by the shell, the renderer and
//! the database drivers:
//!
//! - `Value` for dynamically-typed result cells
//! - `Row` and `ColumnInfo` for streamed result rows and their metadata
//! - `Connection` and `RowCursor`, the database collaborator traits
//! - `Error`, the error taxonomy for connection and execution failures
//! - `Outcome` and `Cx` re-exported from asupersync for cancel-correct operations

// Re-export asupersync primitives for structured concurrency
pub use asupersync::{Cx, Outcome};

pub mod connection;
pub mod error;
pub mod row;
pub mod temporal;
pub mod value;

pub use connection::{Connection, ConnectionConfig, RowCursor, ServerInfo};
pub use error::{Error, Result};
pub use row::{Column, ColumnInfo, Row};
pub use value::Value;
