//! Forward-only schema ladder for the `notes` table.
//!
//! The version lives in `PRAGMA user_version`. A fresh database is created at
//! [`SCHEMA_VERSION`] in one step; an older one gets every pending step in
//! order. Steps, version bumps and the final column check share one
//! transaction, so a rejected database is left as it was found.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Text};
use tracing::{info, warn};

use super::error::{StoreError, StoreResult};
use super::DbConnection;

pub const SCHEMA_VERSION: i32 = 3;

const NOTES_TABLE: &str = "notes";

const CREATE_NOTES: &str = "CREATE TABLE IF NOT EXISTS notes (
    _id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    note TEXT NOT NULL DEFAULT '',
    folder TEXT
);";

const CREATE_NOTES_V2: &str = "CREATE TABLE IF NOT EXISTS notes (
    _id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    note TEXT
);";

const REQUIRED_COLUMNS: &[&str] = &["_id", "title", "note", "folder"];

enum Step {
    Execute(&'static str),
    AddColumn {
        table: &'static str,
        column: &'static str,
        definition: &'static str,
    },
}

struct Migration {
    version: i32,
    description: &'static str,
    step: Step,
}

const LADDER: &[Migration] = &[
    Migration {
        version: 2,
        description: "create notes table",
        step: Step::Execute(CREATE_NOTES_V2),
    },
    Migration {
        version: 3,
        description: "add folder column",
        step: Step::AddColumn {
            table: NOTES_TABLE,
            column: "folder",
            definition: "TEXT",
        },
    },
];

#[derive(QueryableByName)]
struct UserVersion {
    #[sql_type = "Integer"]
    user_version: i32,
}

#[derive(QueryableByName)]
struct ColumnName {
    #[sql_type = "Text"]
    name: String,
}

pub fn run(conn: &DbConnection) -> StoreResult<()> {
    let current = schema_version(conn)?;

    if current > SCHEMA_VERSION {
        warn!(current, supported = SCHEMA_VERSION, "refusing to downgrade schema");
        return Err(StoreError::Schema(format!(
            "database version {} is newer than supported {}",
            current, SCHEMA_VERSION
        )));
    }

    let fresh = current == 0 && !table_exists(conn, NOTES_TABLE)?;

    // the ladder and the column check commit together or not at all
    conn.transaction::<_, StoreError, _>(|| {
        if fresh {
            info!(version = SCHEMA_VERSION, "creating notes schema");
            conn.batch_execute(CREATE_NOTES)
                .map_err(StoreError::from)
                .and_then(|_| set_schema_version(conn, SCHEMA_VERSION))
                .map_err(|e| StoreError::Schema(format!("creating schema failed: {}", e)))?;
        } else {
            // version 0 with a table means the file predates user_version
            for migration in LADDER.iter().filter(|m| m.version > current) {
                info!(
                    version = migration.version,
                    step = migration.description,
                    "running migration"
                );
                apply(conn, &migration.step)
                    .and_then(|_| set_schema_version(conn, migration.version))
                    .map_err(|e| {
                        StoreError::Schema(format!(
                            "migration to v{} ({}) failed: {}",
                            migration.version, migration.description, e
                        ))
                    })?;
            }
        }
        verify_columns(conn)
    })
}

pub fn schema_version(conn: &DbConnection) -> StoreResult<i32> {
    let rows = diesel::sql_query("PRAGMA user_version").load::<UserVersion>(conn)?;
    Ok(rows.into_iter().next().map(|row| row.user_version).unwrap_or(0))
}

fn set_schema_version(conn: &DbConnection, version: i32) -> StoreResult<()> {
    conn.batch_execute(&format!("PRAGMA user_version = {};", version))?;
    Ok(())
}

fn apply(conn: &DbConnection, step: &Step) -> StoreResult<()> {
    match step {
        Step::Execute(sql) => conn.batch_execute(sql)?,
        Step::AddColumn {
            table,
            column,
            definition,
        } => {
            if !column_names(conn, table)?.iter().any(|name| name == column) {
                conn.batch_execute(&format!(
                    "ALTER TABLE {} ADD COLUMN {} {};",
                    table, column, definition
                ))?;
            }
        }
    }
    Ok(())
}

fn table_exists(conn: &DbConnection, table: &str) -> StoreResult<bool> {
    Ok(!column_names(conn, table)?.is_empty())
}

fn column_names(conn: &DbConnection, table: &str) -> StoreResult<Vec<String>> {
    Ok(diesel::sql_query(format!("PRAGMA table_info({})", table))
        .load::<ColumnName>(conn)?
        .into_iter()
        .map(|column| column.name)
        .collect())
}

fn verify_columns(conn: &DbConnection) -> StoreResult<()> {
    let columns = column_names(conn, NOTES_TABLE)?;
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !columns.iter().any(|name| name == required))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Schema(format!(
            "notes table is missing column(s): {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_raw() -> DbConnection {
        SqliteConnection::establish(":memory:").expect("in-memory connection")
    }

    #[test]
    fn fresh_database_is_created_at_current_version() {
        let conn = open_raw();
        run(&conn).expect("migrate");
        assert_eq!(schema_version(&conn).expect("version"), SCHEMA_VERSION);
        let columns = column_names(&conn, NOTES_TABLE).expect("columns");
        assert_eq!(columns, vec!["_id", "title", "note", "folder"]);
    }

    #[test]
    fn running_twice_is_a_no_op() {
        let conn = open_raw();
        run(&conn).expect("first run");
        run(&conn).expect("second run");
        assert_eq!(schema_version(&conn).expect("version"), SCHEMA_VERSION);
    }

    #[test]
    fn version_two_gains_folder_column_and_keeps_rows() {
        let conn = open_raw();
        conn.batch_execute(CREATE_NOTES_V2).expect("legacy table");
        conn.batch_execute(
            "INSERT INTO notes (title, note) VALUES ('Groceries', 'milk, eggs');
             PRAGMA user_version = 2;",
        )
        .expect("legacy row");

        run(&conn).expect("migrate");

        assert_eq!(schema_version(&conn).expect("version"), 3);
        assert!(column_names(&conn, NOTES_TABLE)
            .expect("columns")
            .contains(&"folder".to_string()));
        let titles = diesel::sql_query("SELECT title AS name FROM notes WHERE folder IS NULL")
            .load::<ColumnName>(&conn)
            .expect("rows survive");
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].name, "Groceries");
    }

    #[test]
    fn version_one_climbs_the_whole_ladder() {
        let conn = open_raw();
        conn.batch_execute("PRAGMA user_version = 1;").expect("version");
        run(&conn).expect("migrate");
        assert_eq!(schema_version(&conn).expect("version"), 3);
        verify_columns(&conn).expect("complete schema");
    }

    #[test]
    fn unversioned_table_is_treated_as_legacy() {
        let conn = open_raw();
        conn.batch_execute(CREATE_NOTES_V2).expect("legacy table");
        run(&conn).expect("migrate");
        assert_eq!(schema_version(&conn).expect("version"), 3);
        verify_columns(&conn).expect("complete schema");
    }

    #[test]
    fn folder_step_tolerates_existing_column() {
        let conn = open_raw();
        conn.batch_execute(CREATE_NOTES).expect("current table");
        conn.batch_execute("PRAGMA user_version = 2;").expect("stale version");
        run(&conn).expect("re-applying the folder step is harmless");
        assert_eq!(schema_version(&conn).expect("version"), 3);
    }

    #[test]
    fn newer_version_is_rejected() {
        let conn = open_raw();
        conn.batch_execute("PRAGMA user_version = 4;").expect("version");
        match run(&conn) {
            Err(StoreError::Schema(msg)) => assert!(msg.contains("newer"), "{}", msg),
            other => panic!("expected schema failure, got {:?}", other),
        }
    }

    #[test]
    fn broken_table_is_a_schema_failure() {
        let conn = open_raw();
        conn.batch_execute(
            "CREATE TABLE notes (_id INTEGER PRIMARY KEY, title TEXT, folder TEXT);
             PRAGMA user_version = 3;",
        )
        .expect("broken table");
        match run(&conn) {
            Err(StoreError::Schema(msg)) => assert!(msg.ends_with(": note"), "{}", msg),
            other => panic!("expected schema failure, got {:?}", other),
        }
    }

    #[test]
    fn failed_step_leaves_version_untouched() {
        let conn = open_raw();
        conn.batch_execute(
            "CREATE TABLE legacy_notes (_id INTEGER PRIMARY KEY, title TEXT, note TEXT);
             CREATE VIEW notes AS SELECT * FROM legacy_notes;
             PRAGMA user_version = 2;",
        )
        .expect("view standing in for the table");
        match run(&conn) {
            Err(StoreError::Schema(msg)) => assert!(msg.starts_with("migration to v3"), "{}", msg),
            other => panic!("expected schema failure, got {:?}", other),
        }
        assert_eq!(schema_version(&conn).expect("version"), 2);
    }

    #[test]
    fn rejected_table_is_not_modified() {
        let conn = open_raw();
        conn.batch_execute("CREATE TABLE notes (_id INTEGER PRIMARY KEY, title TEXT);")
            .expect("truncated table");
        match run(&conn) {
            Err(StoreError::Schema(msg)) => assert!(msg.ends_with(": note"), "{}", msg),
            other => panic!("expected schema failure, got {:?}", other),
        }
        assert_eq!(schema_version(&conn).expect("version"), 0);
        assert_eq!(
            column_names(&conn, NOTES_TABLE).expect("columns"),
            vec!["_id", "title"]
        );
    }
}
