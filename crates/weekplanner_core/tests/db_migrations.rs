use rusqlite::Connection;
use weekplanner_core::db::migrations::latest_version;
use weekplanner_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "schedule_tasks");
    assert_table_exists(&conn, "planner_meta");
    assert_table_exists(&conn, "task_names");
}

#[test]
fn opening_same_database_twice_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planner.sqlite3");

    let first = open_db(&path).unwrap();
    first
        .execute("INSERT INTO task_names (name) VALUES ('Run');", [])
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    let count: i64 = second
        .query_row("SELECT COUNT(*) FROM task_names;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(
        err.to_string()
            .starts_with("planner database schema version 999 is newer"),
        "unexpected message: {err}"
    );
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn schema_rejects_out_of_range_priority_and_blank_names() {
    let conn = open_db_in_memory().unwrap();

    let priority = conn.execute(
        "INSERT INTO schedule_tasks (weekday, time, task_name, priority)
         VALUES ('MONDAY', '07:00', 'Run', 11);",
        [],
    );
    assert!(priority.is_err());

    let weekday = conn.execute(
        "INSERT INTO schedule_tasks (weekday, time, task_name, priority)
         VALUES ('FUNDAY', '07:00', 'Run', 3);",
        [],
    );
    assert!(weekday.is_err());

    let blank = conn.execute("INSERT INTO task_names (name) VALUES ('  ');", []);
    assert!(blank.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
