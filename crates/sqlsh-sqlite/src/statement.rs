//! Owned statement handles and per-statement deadlines.

use libsqlite3_sys as ffi;
use std::ffi::{c_int, c_void};
use std::ptr;
use std::time::{Duration, Instant};

/// Number of virtual machine instructions between deadline checks.
const PROGRESS_INTERVAL: c_int = 1000;

/// A prepared statement, finalized on drop.
///
/// `raw` is null when the prepared text held no statement (only whitespace
/// or comments).
pub(crate) struct Statement {
    raw: *mut ffi::sqlite3_stmt,
}

impl Statement {
    pub(crate) fn new(raw: *mut ffi::sqlite3_stmt) -> Self {
        Self { raw }
    }

    pub(crate) fn raw(&self) -> *mut ffi::sqlite3_stmt {
        self.raw
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.raw.is_null()
    }
}

impl Drop for Statement {
    fn drop(&mut self) {
        if !self.raw.is_null() {
            // SAFETY: raw came from sqlite3_prepare_v2 and is finalized once
            unsafe { ffi::sqlite3_finalize(self.raw) };
        }
    }
}

/// Interrupts statements on `db` once `timeout` has passed.
///
/// Installs a progress handler for its lifetime and removes it on drop. The
/// handler reads the boxed deadline, so the box must stay put until the
/// handler is gone.
pub(crate) struct Deadline {
    db: *mut ffi::sqlite3,
    at: Box<Instant>,
    timeout: Duration,
}

unsafe extern "C" fn deadline_passed(arg: *mut c_void) -> c_int {
    // SAFETY: arg is the Box<Instant> owned by a live Deadline
    let at = unsafe { &*arg.cast::<Instant>() };
    c_int::from(Instant::now() >= *at)
}

impl Deadline {
    pub(crate) fn start(db: *mut ffi::sqlite3, timeout: Duration) -> Self {
        let now = Instant::now();
        let at = Box::new(
            now.checked_add(timeout)
                .unwrap_or_else(|| now + Duration::from_secs(86_400 * 365)),
        );
        let arg = ptr::from_ref::<Instant>(&*at).cast_mut().cast::<c_void>();
        // SAFETY: db is open; arg outlives the registration (removed in drop)
        unsafe {
            ffi::sqlite3_progress_handler(db, PROGRESS_INTERVAL, Some(deadline_passed), arg);
        }
        Self { db, at, timeout }
    }

    pub(crate) fn expired(&self) -> bool {
        Instant::now() >= *self.at
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        // SAFETY: db is still open; passing None removes the handler
        unsafe { ffi::sqlite3_progress_handler(self.db, 0, None, ptr::null_mut()) };
    }
}
