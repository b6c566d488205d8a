//! Error types for the storage layer and for process startup.
//!
//! Nothing here knows about HTTP. `crate::protocol` decides which of these
//! conditions reach the client with a dedicated status.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// No response exists under the requested identifier. Every backend maps
    /// its own "missing" condition onto this one variant.
    #[error("Not Found")]
    NotFound,

    /// The backend deliberately lacks this capability.
    #[error("{operation} is not supported by the {backend} data store")]
    Unsupported {
        operation: &'static str,
        backend: &'static str,
    },

    #[error("Document database error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, StoreError::Unsupported { .. })
    }
}

/// Failures that stop the server (or a tool) from starting.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Invalid DATA_STORE_URL: {0}")]
    InvalidDataStoreUrl(String),

    #[error("Must set a DATA_STORE_URL of either mongodb, s3 or sqlite")]
    UnknownScheme(String),

    #[error("No path prefix is supported for S3")]
    S3PathPrefix,

    #[error("Invalid BIND address: {0}")]
    InvalidBind(String),

    #[error("Failed to connect data store: {0}")]
    Store(#[from] StoreError),
}
