//! Embedded SQLite survey store.
//!
//! # Overview
//!
//! Responses live in a single `responses` table keyed by identifier, with the
//! stored response kept as a JSON document. Connections come from an r2d2
//! pool and every query runs on tokio's blocking thread pool so async workers
//! never wait on disk I/O.

use crate::errors::StoreError;
use crate::models::{Response, Stats, StoredResponse};
use crate::store::{SurveyStore, new_response_id};
use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::{debug, info, trace};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS responses (
    id TEXT PRIMARY KEY NOT NULL,
    document TEXT NOT NULL
)";

/// Thread-safe SQLite store; clones share the same pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    /// Opens or creates the database at `db_path` (`:memory:` for a private
    /// in-memory database) and makes sure the schema exists.
    ///
    /// # Errors
    /// Fails if the pool cannot be built or the schema cannot be created.
    ///
    /// # Logging
    /// Emits info-level logs on open.
    pub fn open(db_path: &str) -> Result<Self, StoreError> {
        if db_path == ":memory:" {
            return Self::in_memory();
        }
        info!(db_path, "Opening SQLite database and creating connection pool");

        let manager = SqliteConnectionManager::file(db_path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);
        let pool = Pool::new(manager)?;

        {
            let conn = pool.get()?;
            let mode: String =
                conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
            debug!(mode = %mode, "Journal mode set");
            conn.execute(SCHEMA, [])?;
        }

        info!("SQLite store ready");
        Ok(Self { pool })
    }

    /// A private in-memory database. The pool holds a single connection
    /// because each SQLite in-memory connection is its own database.
    pub fn in_memory() -> Result<Self, StoreError> {
        let pool = Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory())?;
        pool.get()?.execute(SCHEMA, [])?;
        Ok(Self { pool })
    }

    /// Runs `f` with a pooled connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn)
        })
        .await?
    }
}

#[async_trait]
impl SurveyStore for SqliteStore {
    async fn add_survey_response(&self, response: Response) -> Result<StoredResponse, StoreError> {
        let stored = StoredResponse::new(new_response_id(), response);
        let document = serde_json::to_string(&stored)?;
        let id = stored.id.clone();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO responses (id, document) VALUES (?1, ?2)",
                params![id, document],
            )?;
            Ok(())
        })
        .await?;

        debug!(id = %stored.id, "Inserted response row");
        Ok(stored)
    }

    async fn get_survey_response(&self, id: &str) -> Result<StoredResponse, StoreError> {
        let key = id.to_string();
        let document = self
            .with_conn(move |conn| {
                trace!(id = %key, "Loading response row");
                Ok(conn
                    .query_row(
                        "SELECT document FROM responses WHERE id = ?1",
                        [&key],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?)
            })
            .await?;

        match document {
            Some(document) => Ok(serde_json::from_str(&document)?),
            None => {
                debug!(id, "No response row");
                Err(StoreError::NotFound)
            }
        }
    }

    async fn get_stats(&self) -> Result<Stats, StoreError> {
        let count = self
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM responses", [], |row| {
                    row.get::<_, i64>(0)
                })?)
            })
            .await?;
        Ok(Stats {
            count: count.max(0) as u64,
        })
    }
}
