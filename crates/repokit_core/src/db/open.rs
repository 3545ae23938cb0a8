//! Connection bootstrap utilities for SQLite.
//!
//! # Invariants
//! - `foreign_keys` and `busy_timeout` are applied before a connection is
//!   handed out.
//! - Every open emits one `db_open` start event and one ok/error event.

use super::{DbError, DbResult};
use crate::config::DatabaseConfig;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a SQLite database file with default connection settings.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let config = DatabaseConfig {
        path: Some(path.as_ref().to_path_buf()),
        ..DatabaseConfig::default()
    };
    open_with_config(&config)
}

/// Opens an in-memory SQLite database with default connection settings.
///
/// Each call returns an independent, empty database.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with_config(&DatabaseConfig::default())
}

/// Opens the database described by `config`.
///
/// `config.path == None` selects an in-memory database. Missing parent
/// directories of a file database are created.
///
/// # Side effects
/// - Emits `db_open` logging events with mode, duration and status.
pub fn open_with_config(config: &DatabaseConfig) -> DbResult<Connection> {
    let mode = if config.path.is_some() { "file" } else { "memory" };
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let result = connect(config).and_then(|conn| {
        configure(&conn, config)?;
        Ok(conn)
    });

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }

    result
}

fn connect(config: &DatabaseConfig) -> DbResult<Connection> {
    let Some(path) = config.path.as_deref() else {
        return Ok(Connection::open_in_memory()?);
    };

    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| DbError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    Ok(Connection::open(path)?)
}

fn configure(conn: &Connection, config: &DatabaseConfig) -> DbResult<()> {
    let foreign_keys = if config.foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))?;
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    Ok(())
}
