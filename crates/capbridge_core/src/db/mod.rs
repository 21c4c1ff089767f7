//! SQLite bootstrap for the persistent settings store.
//!
//! # Responsibility
//! - Open file-backed or in-memory SQLite connections.
//! - Apply settings schema migrations before returning a connection.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No settings row is read or written before migrations succeed.

use log::{error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub mod migrations;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "settings schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Where the settings database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    Memory,
}

impl DbLocation {
    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

/// Opens the settings database and applies pending migrations.
///
/// # Side effects
/// - Emits `settings_db_open` events with duration and status.
pub fn open_db(location: &DbLocation) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = location.mode();
    info!("event=settings_db_open module=db status=start mode={mode}");

    let result = connect(location).and_then(|mut conn| {
        conn.busy_timeout(Duration::from_secs(5))?;
        migrations::apply_migrations(&mut conn)?;
        Ok(conn)
    });

    match &result {
        Ok(_) => info!(
            "event=settings_db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=settings_db_open module=db status=error mode={mode} duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

/// Opens a file-backed settings database.
pub fn open_db_file(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_db(&DbLocation::File(path.as_ref().to_path_buf()))
}

/// Opens an in-memory settings database.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_db(&DbLocation::Memory)
}

fn connect(location: &DbLocation) -> DbResult<Connection> {
    let conn = match location {
        DbLocation::File(path) => Connection::open(path)?,
        DbLocation::Memory => Connection::open_in_memory()?,
    };
    Ok(conn)
}
