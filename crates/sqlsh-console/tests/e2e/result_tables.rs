//! E2E tests for result table rendering.

use super::output_capture::{FixtureCursor, body_lines, render_to_string};
use sqlsh_core::{Column, Value};
use std::sync::atomic::Ordering;

#[test]
fn e2e_mixed_value_kinds() {
    let cursor = FixtureCursor::new(
        vec![
            Column::new("id").decl_type("INTEGER"),
            Column::new("payload").decl_type("BLOB"),
            Column::new("created").decl_type("DATETIME"),
            Column::new("note"),
        ],
        vec![
            vec![
                Value::BigInt(1),
                Value::Bytes(b"abc".to_vec()),
                Value::Timestamp(1_700_000_000_000_000),
                Value::Null,
            ],
            vec![
                Value::BigInt(2),
                Value::Null,
                Value::Date(0),
                Value::Text("ok".into()),
            ],
        ],
    );
    let out = render_to_string(cursor, 1000, false);
    let expected = "\
+------+---------+---------------------+------+
| id   | payload | created             | note | 
+------+---------+---------------------+------+
| 1    | abc     | 2023-11-14 22:13:20 | NULL | 
| 2    | NULL    | 1970-01-01 00:00:00 | ok   | 
+------+---------+---------------------+------+
(2 rows affected)

";
    assert_eq!(out, expected);
}

#[test]
fn e2e_empty_result_still_draws_header() {
    let cursor = FixtureCursor::named(&["id", "name"], vec![]);
    let out = render_to_string(cursor, 1000, false);
    assert_eq!(
        out,
        "+------+------+\n| id   | name | \n+------+------+\n+------+------+\n(0 rows affected)\n\n"
    );
}

#[test]
fn e2e_render_is_idempotent() {
    let rows = || {
        (0..25)
            .map(|i| vec![Value::BigInt(i), Value::Text("v".repeat(i as usize * 3))])
            .collect::<Vec<_>>()
    };
    let first = render_to_string(FixtureCursor::named(&["i", "text"], rows()), 1000, false);
    let second = render_to_string(FixtureCursor::named(&["i", "text"], rows()), 1000, false);
    assert_eq!(first, second);
}

#[test]
fn e2e_row_cap_limits_rows_and_fetches() {
    let rows = (0..5000).map(|i| vec![Value::BigInt(i)]).collect();
    let cursor = FixtureCursor::named(&["n"], rows);
    let pulled = cursor.pulled.clone();
    let dropped = cursor.dropped.clone();

    let out = render_to_string(cursor, 1000, false);

    assert_eq!(body_lines(&out).len(), 1000);
    assert!(out.ends_with("(1000 rows affected)\n\n"));
    assert_eq!(pulled.load(Ordering::SeqCst), 1000);
    assert!(dropped.load(Ordering::SeqCst));
}

#[test]
fn e2e_small_row_cap() {
    let rows = (0..10).map(|i| vec![Value::BigInt(i)]).collect();
    let out = render_to_string(FixtureCursor::named(&["n"], rows), 2, false);
    assert_eq!(body_lines(&out), vec!["| 0    | ", "| 1    | "]);
    assert!(out.ends_with("(2 rows affected)\n\n"));
}

#[test]
fn e2e_truncated_cell_is_exactly_fifty() {
    let long = "0123456789".repeat(12);
    let cursor = FixtureCursor::named(&["doc"], vec![vec![Value::Text(long.clone())]]);
    let out = render_to_string(cursor, 1000, false);

    let body = body_lines(&out);
    let cell = body[0]
        .strip_prefix("| ")
        .and_then(|l| l.strip_suffix(" | "))
        .unwrap();
    assert_eq!(cell.chars().count(), 50);
    assert!(cell.ends_with("..."));
    assert_eq!(&cell[..47], &long[..47]);
    assert!(out.starts_with(&format!("+{}+\n", "-".repeat(52))));
}

#[test]
fn e2e_capped_column_stays_capped() {
    let cursor = FixtureCursor::named(
        &["v"],
        vec![
            vec![Value::Text("a".repeat(70))],
            vec![Value::Text("short".into())],
            vec![Value::Text("b".repeat(200))],
        ],
    );
    let out = render_to_string(cursor, 1000, false);
    for line in body_lines(&out) {
        assert_eq!(line.chars().count(), 55);
    }
    assert!(body_lines(&out)[1].starts_with("| short "));
}
