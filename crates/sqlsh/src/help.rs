//! Static help text and the connection banner.

use sqlsh_core::ServerInfo;

/// Printed by the `help` command.
pub const HELP_TEXT: &str = "
sqlsh Commands
==============

General:
  help                    Show this help
  exit, quit              Exit
  clear, cls              Clear screen
  timing                  Toggle timing
  GO                      Execute batch
  ;                       Execute batch (at end of line)

Database:
  USE <database>          Switch to another database file (:memory: for a scratch database)

Query Commands:
  SELECT ...              Query data
  WITH ...                Query with common table expressions
  VALUES ...              Literal rows
  INSERT ...              Insert data
  UPDATE ...              Update data
  DELETE ...              Delete data

Schema Commands:
  CREATE TABLE ...        Create table
  ALTER TABLE ...         Alter table
  DROP TABLE ...          Drop table
  CREATE INDEX ...        Create index

Introspection:
  SELECT name FROM sqlite_schema WHERE type = 'table'
  PRAGMA table_info(<table>)
  PRAGMA index_list(<table>)
  EXPLAIN QUERY PLAN SELECT ...

Results show at most the configured number of rows (--max-rows, default 1000).
Each statement is cancelled after the configured timeout (--timeout, default 60 seconds).

";

/// Welcome text shown once after connecting.
pub fn banner(info: &ServerInfo, database: &str) -> String {
    format!(
        "{} {}\nDatabase: {}\nType 'help' for commands.\n\n",
        info.product, info.version, database
    )
}
