mod common;

use common::{Bar, Foo};
use repokit_core::db::{open_db, open_with_config};
use repokit_core::{DatabaseConfig, EntityRepository, MinimalRepository, SqliteStore};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn open_db_creates_missing_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("repokit.sqlite3");

    let conn = open_db(&path).unwrap();
    conn.execute_batch("CREATE TABLE scratch (id INTEGER);").unwrap();

    assert!(path.exists());
}

#[test]
fn config_controls_connection_pragmas() {
    let dir = TempDir::new().unwrap();
    let config = DatabaseConfig {
        path: Some(dir.path().join("pragmas.sqlite3")),
        busy_timeout_ms: 1_234,
        foreign_keys: false,
    };

    let conn = open_with_config(&config).unwrap();

    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    let busy_timeout: i64 = conn
        .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 0);
    assert_eq!(busy_timeout, 1_234);
}

#[test]
fn default_config_enables_foreign_keys() {
    let conn = open_with_config(&DatabaseConfig::default()).unwrap();

    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[test]
fn ensure_table_is_idempotent() {
    let conn = open_with_config(&DatabaseConfig::default()).unwrap();
    let store = SqliteStore::new(&conn);

    store.ensure_table::<Foo>().unwrap();
    store.ensure_table::<Foo>().unwrap();
    store.ensure_table::<Bar>().unwrap();

    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('foos', 'bars');",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 2);
}

#[test]
fn records_persist_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("persist.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        SqliteStore::new(&conn).ensure_table::<Bar>().unwrap();
        let repo = EntityRepository::<_, Bar>::sqlite(&conn);
        assert!(repo.save(&Bar::new("kept", "survives reopen")).is_success());
    }

    let conn = open_db(&path).unwrap();
    let repo = EntityRepository::<_, Bar>::sqlite(&conn);
    let loaded = repo.retrieve_by_id("kept").unwrap().unwrap();
    assert_eq!(loaded.label, "survives reopen");
}

#[test]
fn busy_timeout_default_is_applied() {
    let conn = open_with_config(&DatabaseConfig::default()).unwrap();

    let busy_timeout: i64 = conn
        .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
        .unwrap();
    let expected = Duration::from_millis(DatabaseConfig::default().busy_timeout_ms);
    assert_eq!(busy_timeout as u128, expected.as_millis());
}
