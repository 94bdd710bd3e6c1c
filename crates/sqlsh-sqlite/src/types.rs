//! Decoding SQLite result columns into `Value`s.
//!
//! SQLite has 5 storage classes (INTEGER, REAL, TEXT, BLOB, NULL) and no
//! temporal type. Dates and timestamps are stored as text, so a TEXT value in
//! a column declared `DATE`, `DATETIME` or `TIMESTAMP` is parsed and, when it
//! has the expected shape, surfaced as `Value::Date` / `Value::Timestamp`.

use libsqlite3_sys as ffi;
use sqlsh_core::Value;
use sqlsh_core::row::Column;
use sqlsh_core::temporal::{Temporal, parse_temporal};
use std::ffi::{CStr, c_int};

/// Does this declared type hold dates or timestamps?
pub fn is_temporal_decl(decl_type: &str) -> bool {
    let upper = decl_type.to_ascii_uppercase();
    upper.contains("DATE") || upper.contains("TIMESTAMP")
}

/// Read a column value from a result row.
///
/// # Safety
/// - `stmt` must be a valid prepared statement that has just returned SQLITE_ROW
/// - `index` must be a valid 0-based column index
pub unsafe fn read_column(stmt: *mut ffi::sqlite3_stmt, index: c_int, temporal: bool) -> Value {
    // SAFETY: guaranteed by the caller
    unsafe {
        match ffi::sqlite3_column_type(stmt, index) {
            ffi::SQLITE_NULL => Value::Null,

            ffi::SQLITE_INTEGER => {
                let v = ffi::sqlite3_column_int64(stmt, index);
                i32::try_from(v).map_or(Value::BigInt(v), Value::Int)
            }

            ffi::SQLITE_FLOAT => Value::Double(ffi::sqlite3_column_double(stmt, index)),

            ffi::SQLITE_TEXT => {
                let ptr = ffi::sqlite3_column_text(stmt, index);
                let len = ffi::sqlite3_column_bytes(stmt, index);
                if ptr.is_null() {
                    return Value::Null;
                }
                let slice = std::slice::from_raw_parts(ptr, len as usize);
                let text = String::from_utf8_lossy(slice).into_owned();
                if temporal {
                    match parse_temporal(&text) {
                        Some(Temporal::Date(days)) => return Value::Date(days),
                        Some(Temporal::Timestamp(micros)) => return Value::Timestamp(micros),
                        None => {}
                    }
                }
                Value::Text(text)
            }

            ffi::SQLITE_BLOB => {
                let ptr = ffi::sqlite3_column_blob(stmt, index);
                let len = ffi::sqlite3_column_bytes(stmt, index);
                if ptr.is_null() || len == 0 {
                    Value::Bytes(Vec::new())
                } else {
                    std::slice::from_raw_parts(ptr.cast::<u8>(), len as usize)
                        .to_vec()
                        .into()
                }
            }

            _ => Value::Null,
        }
    }
}

/// Name and declared type of a result column.
///
/// # Safety
/// - `stmt` must be a valid prepared statement
/// - `index` must be a valid 0-based column index
pub unsafe fn column(stmt: *mut ffi::sqlite3_stmt, index: c_int) -> Column {
    // SAFETY: guaranteed by the caller; both calls return NUL-terminated
    // strings owned by the statement, or NULL.
    let (name, decl) = unsafe {
        (
            c_string(ffi::sqlite3_column_name(stmt, index)),
            c_string(ffi::sqlite3_column_decltype(stmt, index)),
        )
    };
    let column = Column::new(name.unwrap_or_else(|| format!("col{}", index)));
    match decl {
        Some(decl) => column.decl_type(decl),
        None => column,
    }
}

unsafe fn c_string(ptr: *const std::ffi::c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        // SAFETY: non-null pointers from SQLite are valid C strings
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }
}
