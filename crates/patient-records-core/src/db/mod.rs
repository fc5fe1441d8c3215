//! Record store for patient-records.

mod schema;
mod patients;
mod specialties;
mod pharmacy;

pub use schema::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

use crate::changes::{ChangeAction, ChangeEvent, ChangeFeed, ChangeKind, SubscriberId};

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Map SQLite constraint failures (UNIQUE, FOREIGN KEY, CHECK) to
/// [`DbError::Constraint`] with the given message; pass anything else through.
pub(crate) fn constraint_error(err: rusqlite::Error, message: impl FnOnce() -> String) -> DbError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            let message = message();
            tracing::warn!(error = %err, "{message}");
            DbError::Constraint(message)
        }
        _ => DbError::Sqlite(err),
    }
}

/// Database connection wrapper.
///
/// Every committed mutation is announced on the connection's [`ChangeFeed`].
pub struct Database {
    conn: Connection,
    changes: ChangeFeed,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        tracing::info!(path = %path.as_ref().display(), "opening record store");
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> DbResult<Self> {
        let db = Self {
            conn,
            changes: ChangeFeed::new(),
        };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction.
    pub fn transaction(&mut self) -> DbResult<rusqlite::Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    /// Receive a [`ChangeEvent`] for every mutation committed from now on.
    pub fn subscribe(&self) -> std::sync::mpsc::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    /// Like [`Self::subscribe`], with an id for [`Self::unsubscribe`].
    pub fn subscribe_with_id(&self) -> (SubscriberId, std::sync::mpsc::Receiver<ChangeEvent>) {
        self.changes.register()
    }

    /// Stop delivering changes to a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.changes.unsubscribe(id)
    }

    fn notify(&self, kind: ChangeKind, action: ChangeAction, record_id: Option<&str>) {
        self.changes.publish(ChangeEvent {
            kind,
            action,
            record_id: record_id.map(str::to_string),
        });
    }
}
