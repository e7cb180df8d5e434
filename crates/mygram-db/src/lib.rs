pub mod migrations;
pub mod models;
pub mod queries;

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing::info;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,

    /// A unique constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[source] rusqlite::Error),

    #[error("DB lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, msg) = &err {
            match code.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => {
                    return DbError::Conflict(
                        msg.clone()
                            .unwrap_or_else(|| "unique constraint failed".to_string()),
                    );
                }
                // The referenced parent row is gone.
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return DbError::NotFound,
                _ => {}
            }
        }
        DbError::Sqlite(err)
    }
}

/// Handle to the relational store. Constructed once at startup and passed to
/// whatever needs it.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::init(conn)?;
        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DbError::LockPoisoned(e.to_string()))?;
        f(&conn)
    }

    /// Like `with_conn`, but hands out a mutable connection so the closure can
    /// open a transaction.
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DbError::LockPoisoned(e.to_string()))?;
        f(&mut conn)
    }
}
