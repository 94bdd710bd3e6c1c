use asupersync::runtime::RuntimeBuilder;
use clap::Parser;
use sqlsh::help::banner;
use sqlsh::{Args, EditorLineSource, LineSource, ScriptLineSource, Session, Shell, ShellConfig};
use sqlsh_console::ShellConsole;
use sqlsh_core::{Connection, Cx, Error, Outcome, Result};
use sqlsh_sqlite::SqliteConnection;
use std::process::ExitCode;

fn main() -> ExitCode {
    sqlsh::logging::init_logging();

    let config = match ShellConfig::from_args(Args::parse()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("sqlsh: {}", e);
            return ExitCode::from(2);
        }
    };

    let rt = match RuntimeBuilder::current_thread().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("sqlsh: failed to start runtime: {:?}", e);
            return ExitCode::FAILURE;
        }
    };
    let cx = Cx::for_testing();

    match rt.block_on(run(&cx, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("sqlsh: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cx: &Cx, config: ShellConfig) -> Result<()> {
    let mut conn = SqliteConnection::open(&config.connection)?;
    settle(conn.ping(cx).await)?;
    let info = settle(conn.server_info(cx).await)?;
    tracing::info!(product = %info.product, version = %info.version, database = %config.database(), "Connected");

    let mut console = ShellConsole::stdout();
    if config.banner && config.interactive() {
        console.print(&banner(&info, config.database()))?;
    }

    let session = Session::new(config.database(), config.max_rows).timing(config.timing);
    match &config.input {
        Some(path) => {
            let source = ScriptLineSource::from_path(path)?;
            drive(cx, conn, source, console, session, &config).await
        }
        None => {
            let source = EditorLineSource::open(config.history.clone())?;
            drive(cx, conn, source, console, session, &config).await
        }
    }
}

async fn drive<S: LineSource>(
    cx: &Cx,
    conn: SqliteConnection,
    source: S,
    console: ShellConsole<std::io::Stdout>,
    session: Session,
    config: &ShellConfig,
) -> Result<()> {
    let mut shell = Shell::new(conn, source, console, session).timeout(config.query_timeout());
    let result = shell.run(cx).await;
    let (conn, _, _, _) = shell.into_parts();
    conn.close(cx).await?;
    result
}

fn settle<T>(outcome: Outcome<T, Error>) -> Result<T> {
    match outcome {
        Outcome::Ok(value) => Ok(value),
        Outcome::Err(e) => Err(e),
        Outcome::Cancelled(_) => Err(Error::Cancelled),
        Outcome::Panicked(p) => Err(Error::Custom(format!("Driver panicked: {:?}", p))),
    }
}
