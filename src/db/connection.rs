//! Database connection management
//!
//! Pooled SQLite connections for the stock store.

use std::path::Path;
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

/// Database error types
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Unknown category: {0}")]
    UnknownCategory(i64),
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

const POOL_SIZE: u32 = 8;

/// Per-connection setup run by the pool
fn configure(conn: &mut Connection) -> rusqlite::Result<()> {
    // Foreign keys guard stock_items.category_id; WAL lets readers run during writes
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA temp_store = MEMORY;",
    )
}

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl Database {
    /// Open (creating if needed) the database file
    pub fn new<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        // Create the file on first run
        let manager = SqliteConnectionManager::file(path)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI,
            )
            .with_init(configure);

        // Build the pool; this opens a first connection and fails fast
        let pool = Pool::builder().max_size(POOL_SIZE).build(manager)?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// A private in-memory database. Single connection, since every
    /// in-memory connection is its own database.
    pub fn in_memory() -> DbResult<Self> {
        let manager = SqliteConnectionManager::memory().with_init(configure);
        let pool = Pool::builder().max_size(1).build(manager)?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Get a connection from the pool
    pub fn get_conn(&self) -> DbResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Execute a closure with a database connection
    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let conn = self.get_conn()?;
        f(&conn)
    }

    /// Execute a closure inside a transaction, committing on success
    pub fn with_transaction<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> DbResult<T>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        // An error returns early and drops tx, which rolls back
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}
