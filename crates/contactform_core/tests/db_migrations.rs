use contactform_core::db::migrations::{apply_migrations, current_user_version, latest_version};
use contactform_core::db::{open_db, open_db_in_memory, open_db_with_config, DbError};
use contactform_core::{Contact, ContactRepository, SqliteContactRepository, StoreConfig};
use rusqlite::Connection;
use std::time::Duration;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "contact_messages");
    assert_index_exists(&conn, "idx_contact_messages_deleted_at");
}

#[test]
fn opening_same_database_twice_is_idempotent_and_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.db");

    let conn_first = open_db(&path).unwrap();
    {
        let repo = SqliteContactRepository::try_new(&conn_first).unwrap();
        let mut contact = Contact::new("Ann Lee", "ann@example.com", "555-0100", "Hi");
        repo.create(&mut contact).unwrap();
    }
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let repo = SqliteContactRepository::try_new(&conn_second).unwrap();
    assert_eq!(repo.find_all().unwrap().len(), 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }

    let untouched = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&untouched), 999);
}

#[test]
fn apply_migrations_reports_steps_and_is_a_no_op_when_current() {
    let mut conn = Connection::open_in_memory().unwrap();

    assert_eq!(apply_migrations(&mut conn).unwrap(), latest_version());
    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert_eq!(apply_migrations(&mut conn).unwrap(), 0);
}

#[test]
fn open_db_with_config_uses_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        db_path: dir.path().join("configured.db"),
        busy_timeout: Duration::from_millis(100),
        ..StoreConfig::default()
    };

    let conn = open_db_with_config(&config).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert!(config.db_path.exists());
}

#[test]
fn schema_enforces_not_null_and_length_constraints() {
    let conn = open_db_in_memory().unwrap();

    let null_err = conn
        .execute(
            "INSERT INTO contact_messages
                (full_name, email, phone, message, created_at, updated_at)
             VALUES (NULL, 'ann@example.com', '555-0100', 'Hi', 1, 1);",
            [],
        )
        .unwrap_err();
    assert!(DbError::Sqlite(null_err).is_constraint_violation());

    let long_phone = "1".repeat(21);
    let check_err = conn
        .execute(
            "INSERT INTO contact_messages
                (full_name, email, phone, message, created_at, updated_at)
             VALUES ('Ann Lee', 'ann@example.com', ?1, 'Hi', 1, 1);",
            [long_phone.as_str()],
        )
        .unwrap_err();
    assert!(DbError::Sqlite(check_err).is_constraint_violation());
}

#[test]
fn schema_rejects_blank_and_whitespace_only_text() {
    let conn = open_db_in_memory().unwrap();

    for (full_name, email, phone, message) in [
        ("", "ann@example.com", "555-0100", "Hi"),
        ("Ann Lee", "   ", "555-0100", "Hi"),
        ("Ann Lee", "ann@example.com", "\t", "Hi"),
        ("Ann Lee", "ann@example.com", "555-0100", " \n "),
    ] {
        let err = conn
            .execute(
                "INSERT INTO contact_messages
                    (full_name, email, phone, message, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, 1, 1);",
                [full_name, email, phone, message],
            )
            .unwrap_err();
        assert!(DbError::Sqlite(err).is_constraint_violation());
    }

    let stored: i64 = conn
        .query_row("SELECT COUNT(*) FROM contact_messages;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, 0);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object(conn, "index", index_name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
