//! Row-count and timing footer shown after every statement.

use std::time::Duration;

/// The `(N rows affected)` line, optionally followed by elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    count: u64,
    elapsed: Option<Duration>,
}

impl Summary {
    pub fn new(count: u64) -> Self {
        Self {
            count,
            elapsed: None,
        }
    }

    /// Show elapsed time under the count.
    pub fn elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }

    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Count line, optional `Time: S.mmm sec` line, then a blank line.
    pub fn render_plain(&self) -> String {
        let mut out = match self.count {
            0 => "(0 rows affected)\n".to_string(),
            1 => "(1 row affected)\n".to_string(),
            n => format!("({} rows affected)\n", n),
        };
        if let Some(elapsed) = self.elapsed {
            out.push_str(&format!("Time: {:.3} sec\n", elapsed.as_secs_f64()));
        }
        out.push('\n');
        out
    }
}
