//! # Survey Store
//!
//! The persistence port the request layer talks to, and the backends behind it.
//!
//! - [`MongoStore`]: MongoDB collection, full feature set
//! - [`BlobStore`]: one JSON object per response in an object store (S3),
//!   no statistics
//! - [`SqliteStore`]: embedded SQLite database on an r2d2 pool, full feature set
//!
//! Backends are partial by design. Callers must treat
//! [`StoreError::Unsupported`] as an expected outcome, distinct from a failing
//! backend.

use crate::config::DataStoreUrl;
use crate::errors::{StartupError, StoreError};
use crate::models::{Response, Stats, StoredResponse};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

mod blob;
mod mongo;
mod sqlite;

pub use blob::*;
pub use mongo::*;
pub use sqlite::*;

#[async_trait]
#[cfg_attr(test, automock)]
pub trait SurveyStore: Send + Sync {
    /// Assigns a fresh identifier, persists the response and returns the stored form.
    async fn add_survey_response(&self, response: Response) -> Result<StoredResponse, StoreError>;

    /// Looks a response up by identifier. Missing records yield [`StoreError::NotFound`].
    async fn get_survey_response(&self, id: &str) -> Result<StoredResponse, StoreError>;

    /// Counts stored responses, or reports [`StoreError::Unsupported`].
    async fn get_stats(&self) -> Result<Stats, StoreError>;
}

/// Mints an identifier for a new response: a random (v4) UUID.
pub fn new_response_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builds the backend selected by the data store URL.
pub async fn connect(url: &DataStoreUrl) -> Result<Arc<dyn SurveyStore>, StartupError> {
    let store: Arc<dyn SurveyStore> = match url {
        DataStoreUrl::Mongo { uri, database } => {
            info!(database = %database, "Using MongoDB store");
            Arc::new(MongoStore::connect(uri, database).await?)
        }
        DataStoreUrl::S3 { bucket } => {
            info!(bucket = %bucket, "Using S3 store");
            Arc::new(BlobStore::s3(bucket)?)
        }
        DataStoreUrl::Sqlite { path } => {
            info!(path = %path, "Using SQLite store");
            Arc::new(SqliteStore::open(path)?)
        }
    };
    Ok(store)
}
