//! E2E tests for summaries, timing and diagnostics.

use super::output_capture::{FixtureCursor, render_to_string};
use regex::Regex;
use sqlsh_console::{ShellConsole, Summary};
use sqlsh_core::Value;
use std::time::Duration;

#[test]
fn e2e_summary_plurals() {
    for (count, line) in [
        (0, "(0 rows affected)"),
        (1, "(1 row affected)"),
        (2, "(2 rows affected)"),
    ] {
        let mut console = ShellConsole::new(Vec::new());
        console.print_summary(&Summary::new(count)).unwrap();
        let out = String::from_utf8(console.into_inner()).unwrap();
        assert_eq!(out, format!("{line}\n\n"));
    }
}

#[test]
fn e2e_timing_footer_after_table() {
    let cursor = FixtureCursor::named(&["n"], vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
    let out = render_to_string(cursor, 1000, true);
    let footer = Regex::new(r"\(2 rows affected\)\nTime: \d+\.\d{3} sec\n\n$").unwrap();
    assert!(footer.is_match(&out), "unexpected footer in {out:?}");
}

#[test]
fn e2e_timing_footer_for_affected_count() {
    let mut console = ShellConsole::new(Vec::new());
    console
        .print_summary(&Summary::new(3).elapsed(Duration::from_millis(12)))
        .unwrap();
    let out = String::from_utf8(console.into_inner()).unwrap();
    let re = Regex::new(r"^\(3 rows affected\)\nTime: \d+\.\d{3} sec\n\n$").unwrap();
    assert!(re.is_match(&out));
}

#[test]
fn e2e_failure_diagnostic() {
    let mut console = ShellConsole::new(Vec::new());
    console.print_failure("no such table: missing").unwrap();
    console.print_summary(&Summary::new(0)).unwrap();
    let out = String::from_utf8(console.into_inner()).unwrap();
    assert_eq!(
        out,
        "Msg 50000, Level 16, State 1\nno such table: missing\n\n(0 rows affected)\n\n"
    );
}
