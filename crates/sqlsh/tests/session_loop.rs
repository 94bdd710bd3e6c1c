//! Drives the whole shell loop with scripted input, a fake connection and a
//! captured output buffer.

use asupersync::runtime::RuntimeBuilder;
use regex::Regex;
use sqlsh::help::HELP_TEXT;
use sqlsh::{LineEvent, ScriptLineSource, Session, Shell};
use sqlsh_console::ShellConsole;
use sqlsh_core::error::{QueryError, QueryErrorKind};
use sqlsh_core::{
    ColumnInfo, Connection, Cx, Error, Outcome, Result, Row, RowCursor, ServerInfo, Value,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// ============================================================================
// Fake database
// ============================================================================

#[derive(Debug, Clone)]
enum Canned {
    Rows(Vec<&'static str>, Vec<Vec<Value>>),
    /// `n` good rows, then a fetch error.
    BrokenRows(usize),
    Affected(u64),
    Fail(&'static str),
}

#[derive(Debug, Default)]
struct CursorStats {
    pulled: AtomicUsize,
    dropped: AtomicUsize,
}

struct FakeCursor {
    columns: Arc<ColumnInfo>,
    rows: std::vec::IntoIter<Result<Row>>,
    stats: Arc<CursorStats>,
}

impl Iterator for FakeCursor {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next();
        if row.is_some() {
            self.stats.pulled.fetch_add(1, Ordering::SeqCst);
        }
        row
    }
}

impl RowCursor for FakeCursor {
    fn columns(&self) -> &Arc<ColumnInfo> {
        &self.columns
    }
}

impl Drop for FakeCursor {
    fn drop(&mut self) {
        self.stats.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct FakeConnection {
    canned: HashMap<String, Canned>,
    databases: Vec<String>,
    current: String,
    /// Statements received, with whether they came in as queries.
    log: Vec<(String, bool)>,
    timeouts: Vec<Duration>,
    stats: Arc<CursorStats>,
}

impl FakeConnection {
    fn new() -> Self {
        Self {
            current: "main".into(),
            ..Self::default()
        }
    }

    fn with(mut self, sql: &str, canned: Canned) -> Self {
        self.canned.insert(sql.to_string(), canned);
        self
    }

    fn database(mut self, name: &str) -> Self {
        self.databases.push(name.to_string());
        self
    }

    fn lookup(&mut self, sql: &str, timeout: Duration, query: bool) -> Result<Canned> {
        self.log.push((sql.to_string(), query));
        self.timeouts.push(timeout);
        match self.canned.get(sql) {
            Some(Canned::Fail(message)) => Err(Error::Query(QueryError {
                kind: QueryErrorKind::Database,
                sql: Some(sql.to_string()),
                message: (*message).to_string(),
            })),
            Some(canned) => Ok(canned.clone()),
            None => Err(Error::Query(QueryError {
                kind: QueryErrorKind::Syntax,
                sql: Some(sql.to_string()),
                message: format!("unexpected statement: {sql}"),
            })),
        }
    }

    fn cursor(&self, canned: Canned) -> FakeCursor {
        let (columns, rows) = match canned {
            Canned::Rows(names, rows) => {
                let columns = Arc::new(ColumnInfo::from_names(names));
                let rows = rows
                    .into_iter()
                    .map(|values| Ok(Row::with_columns(Arc::clone(&columns), values)))
                    .collect::<Vec<_>>();
                (columns, rows)
            }
            Canned::BrokenRows(good) => {
                let columns = Arc::new(ColumnInfo::from_names(["n"]));
                let mut rows: Vec<Result<Row>> = (0..good)
                    .map(|i| Ok(Row::with_columns(Arc::clone(&columns), vec![Value::from(i as i64)])))
                    .collect();
                rows.push(Err(Error::Custom("connection reset by peer".into())));
                (columns, rows)
            }
            Canned::Affected(_) | Canned::Fail(_) => (Arc::new(ColumnInfo::default()), Vec::new()),
        };
        FakeCursor {
            columns,
            rows: rows.into_iter(),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl Connection for FakeConnection {
    type Cursor<'conn>
        = FakeCursor
    where
        Self: 'conn;

    fn query(
        &mut self,
        _cx: &Cx,
        sql: &str,
        timeout: Duration,
    ) -> impl Future<Output = Outcome<Self::Cursor<'_>, Error>> + Send {
        let outcome = match self.lookup(sql, timeout, true) {
            Ok(canned) => Outcome::Ok(self.cursor(canned)),
            Err(e) => Outcome::Err(e),
        };
        async move { outcome }
    }

    fn execute(
        &mut self,
        _cx: &Cx,
        sql: &str,
        timeout: Duration,
    ) -> impl Future<Output = Outcome<u64, Error>> + Send {
        let outcome = match self.lookup(sql, timeout, false) {
            Ok(Canned::Affected(n)) => Outcome::Ok(n),
            Ok(_) => Outcome::Ok(0),
            Err(e) => Outcome::Err(e),
        };
        async move { outcome }
    }

    fn ping(&mut self, _cx: &Cx) -> impl Future<Output = Outcome<(), Error>> + Send {
        async { Outcome::Ok(()) }
    }

    fn server_info(&mut self, _cx: &Cx) -> impl Future<Output = Outcome<ServerInfo, Error>> + Send {
        async {
            Outcome::Ok(ServerInfo {
                product: "Fake".into(),
                version: "1.0".into(),
            })
        }
    }

    fn use_database(
        &mut self,
        _cx: &Cx,
        name: &str,
    ) -> impl Future<Output = Outcome<(), Error>> + Send {
        let outcome = if self.databases.iter().any(|d| d == name) {
            self.current = name.to_string();
            Outcome::Ok(())
        } else {
            Outcome::Err(Error::Query(QueryError {
                kind: QueryErrorKind::NotFound,
                sql: None,
                message: format!("Cannot open database '{name}': unable to open database file"),
            }))
        };
        async move { outcome }
    }

    fn close(self, _cx: &Cx) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Finished {
    conn: FakeConnection,
    source: ScriptLineSource,
    session: Session,
    output: String,
}

fn run_shell(conn: FakeConnection, source: ScriptLineSource, session: Session) -> Finished {
    let rt = RuntimeBuilder::current_thread()
        .build()
        .expect("create asupersync runtime");
    let cx = Cx::for_testing();

    let mut shell = Shell::new(conn, source, ShellConsole::new(Vec::new()), session);
    rt.block_on(async { shell.run(&cx).await.expect("session runs to completion") });

    let (conn, source, console, session) = shell.into_parts();
    Finished {
        conn,
        source,
        session,
        output: String::from_utf8(console.into_inner()).expect("utf-8 output"),
    }
}

fn lines(lines: &[&str]) -> ScriptLineSource {
    ScriptLineSource::new(lines.iter().copied())
}

const HEADER: &str = "Msg 50000, Level 16, State 1";

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_timed_non_query_reports_count_and_elapsed() {
    let conn = FakeConnection::new().with("UPDATE t SET x = 1", Canned::Affected(3));
    let done = run_shell(
        conn,
        lines(&["timing", "UPDATE t SET x = 1;", "exit"]),
        Session::new("main", 1000),
    );

    assert!(done.output.starts_with("Timing enabled\n"));
    let footer = Regex::new(r"\(3 rows affected\)\nTime: \d+\.\d{3} sec\n\n").unwrap();
    assert!(footer.is_match(&done.output), "output was {:?}", done.output);
    assert!(done.session.timing_enabled());
    assert_eq!(done.conn.log, [("UPDATE t SET x = 1".to_string(), false)]);
}

#[test]
fn test_untimed_summary_has_no_time_line() {
    let conn = FakeConnection::new()
        .with("DELETE FROM t", Canned::Affected(1))
        .with("CREATE TABLE t (x INTEGER)", Canned::Affected(0));
    let done = run_shell(
        conn,
        lines(&["CREATE TABLE t (x INTEGER)", "GO", "DELETE FROM t;", "quit"]),
        Session::new("main", 1000),
    );
    assert_eq!(done.output, "(0 rows affected)\n\n(1 row affected)\n\n\n");
}

#[test]
fn test_query_renders_table() {
    let conn = FakeConnection::new().with(
        "select id, name\nfrom users",
        Canned::Rows(
            vec!["id", "name"],
            vec![
                vec![Value::Int(1), Value::Text("alice".into())],
                vec![Value::Int(2), Value::Null],
            ],
        ),
    );
    let done = run_shell(
        conn,
        lines(&["select id, name", "from users", "go"]),
        Session::new("main", 1000),
    );

    let expected = "\
+------+-------+
| id   | name  | 
+------+-------+
| 1    | alice | 
| 2    | NULL  | 
+------+-------+
(2 rows affected)

";
    assert_eq!(done.output, format!("{expected}\n"));
    assert_eq!(
        done.conn.log,
        [("select id, name\nfrom users".to_string(), true)]
    );
    assert_eq!(done.conn.stats.dropped.load(Ordering::SeqCst), 1);
}

#[test]
fn test_row_cap_stops_fetching() {
    let rows: Vec<Vec<Value>> = (0..5000).map(|i| vec![Value::Int(i)]).collect();
    let conn = FakeConnection::new().with("SELECT n FROM big", Canned::Rows(vec!["n"], rows));
    let done = run_shell(
        conn,
        lines(&["SELECT n FROM big;"]),
        Session::new("main", 1000),
    );

    assert_eq!(done.conn.stats.pulled.load(Ordering::SeqCst), 1000);
    assert_eq!(done.conn.stats.dropped.load(Ordering::SeqCst), 1);
    assert!(done.output.contains("(1000 rows affected)\n"));
    assert!(done.output.contains("| 999  |"));
    assert!(!done.output.contains("| 1000 |"));
}

#[test]
fn test_failure_prints_diagnostic_and_continues() {
    let conn = FakeConnection::new()
        .with("SELECT * FROM missing", Canned::Fail("no such table: missing"))
        .with("SELECT 1", Canned::Rows(vec!["1"], vec![vec![Value::Int(1)]]));
    let done = run_shell(
        conn,
        lines(&["SELECT * FROM missing;", "SELECT 1;"]),
        Session::new("main", 1000),
    );

    assert!(
        done.output
            .starts_with(&format!("{HEADER}\nno such table: missing\n\n"))
    );
    assert!(done.output.contains("(1 row affected)"));
    assert_eq!(done.conn.log.len(), 2);
}

#[test]
fn test_fetch_error_prints_diagnostic_only() {
    let conn = FakeConnection::new().with("SELECT n FROM flaky", Canned::BrokenRows(3));
    let done = run_shell(
        conn,
        lines(&["SELECT n FROM flaky;"]),
        Session::new("main", 1000),
    );

    assert_eq!(
        done.output,
        format!("{HEADER}\nconnection reset by peer\n\n\n")
    );
    assert_eq!(done.conn.stats.dropped.load(Ordering::SeqCst), 1);
}

#[test]
fn test_use_switches_prompt_and_reports() {
    let conn = FakeConnection::new().database("sales.db");
    let done = run_shell(
        conn,
        lines(&["use sales.db;", "USE nowhere.db", "GO", "use;", "exit"]),
        Session::new("main", 1000),
    );

    assert_eq!(
        done.output,
        "Changed database context to 'sales.db'.\n\
         Error: Cannot open database 'nowhere.db': unable to open database file\n\
         \n"
    );
    assert_eq!(done.session.database(), "sales.db");
    assert_eq!(done.conn.current, "sales.db");
    assert_eq!(
        done.source.prompts(),
        ["main> ", "sales.db> ", "  -> ", "sales.db> ", "sales.db> "]
    );
    // Meta commands never reach the database as statements
    assert!(done.conn.log.is_empty());
}

#[test]
fn test_meta_commands_output() {
    let done = run_shell(
        FakeConnection::new(),
        lines(&["help", "CLS", "timing", "timing", "quit", "SELECT 1;"]),
        Session::new("main", 1000),
    );

    let expected = format!("{HELP_TEXT}\x1b[2J\x1b[HTiming enabled\nTiming disabled\n\n");
    assert_eq!(done.output, expected);
    // Lines after quit are never read
    assert_eq!(done.source.remaining(), 1);
    assert!(!done.session.timing_enabled());
}

#[test]
fn test_end_of_input_exits_and_drops_partial_batch() {
    let done = run_shell(
        FakeConnection::new(),
        lines(&["SELECT *", "FROM t"]),
        Session::new("main", 1000),
    );
    assert_eq!(done.output, "\n");
    assert!(done.conn.log.is_empty());
    assert_eq!(done.source.prompts(), ["main> ", "  -> ", "  -> "]);
}

#[test]
fn test_scripted_input_keeps_prompts_out_of_output() {
    let conn = FakeConnection::new().with("DELETE FROM t\nWHERE x = 1", Canned::Affected(2));
    let done = run_shell(
        conn,
        lines(&["DELETE FROM t", "WHERE x = 1", "GO"]),
        Session::new("main", 1000),
    );

    assert_eq!(done.output, "(2 rows affected)\n\n\n");
    assert!(!done.output.contains("main> "));
    assert!(!done.output.contains("  -> "));
    assert_eq!(
        done.source.prompts(),
        ["main> ", "  -> ", "  -> ", "main> "]
    );
}

#[test]
fn test_blank_lines_and_interrupts_reprompt() {
    let source = ScriptLineSource::from_events([
        LineEvent::Line("   ".into()),
        LineEvent::Interrupted,
        LineEvent::Line(";".into()),
        LineEvent::Line("exit".into()),
    ]);
    let done = run_shell(FakeConnection::new(), source, Session::new("main", 1000));
    assert_eq!(done.output, "\n");
    assert_eq!(done.source.prompts(), ["main> "; 4]);
    assert!(done.conn.log.is_empty());
}

#[test]
fn test_statements_carry_configured_timeout() {
    let conn = FakeConnection::new().with("VACUUM", Canned::Affected(0));
    let rt = RuntimeBuilder::current_thread()
        .build()
        .expect("create asupersync runtime");
    let cx = Cx::for_testing();

    let mut shell = Shell::new(
        conn,
        lines(&["VACUUM;"]),
        ShellConsole::new(Vec::new()),
        Session::new("main", 1000),
    )
    .timeout(Duration::from_secs(7));
    rt.block_on(async { shell.run(&cx).await.expect("session runs") });

    let (conn, _, _, _) = shell.into_parts();
    assert_eq!(conn.timeouts, [Duration::from_secs(7)]);
}
