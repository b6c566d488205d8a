//! Object-store-backed survey store.
//!
//! Every response is a single JSON object at `<id>/response.json`. Point
//! lookups never list the bucket, and there is no way to count responses
//! without one, so statistics are unsupported.

use crate::errors::StoreError;
use crate::models::{Response, Stats, StoredResponse};
use crate::store::{SurveyStore, new_response_id};
use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use std::sync::Arc;
use tracing::{debug, info};

const OBJECT_NAME: &str = "response.json";

#[derive(Clone, Debug)]
pub struct BlobStore {
    store: Arc<dyn ObjectStore>,
}

impl BlobStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Opens an S3 bucket. Credentials and region come from the usual AWS
    /// environment variables.
    pub fn s3(bucket: &str) -> Result<Self, StoreError> {
        let s3 = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .build()?;
        info!(bucket, "S3 store ready");
        Ok(Self::new(Arc::new(s3)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()))
    }
}

/// Key of the object holding the response with this identifier.
pub fn object_key(id: &str) -> Path {
    Path::from(format!("{}/{}", id, OBJECT_NAME))
}

#[async_trait]
impl SurveyStore for BlobStore {
    async fn add_survey_response(&self, response: Response) -> Result<StoredResponse, StoreError> {
        let stored = StoredResponse::new(new_response_id(), response);
        let data = serde_json::to_vec(&stored)?;
        let key = object_key(&stored.id);

        self.store.put(&key, PutPayload::from(data)).await?;
        debug!(key = %key, "Wrote response object");
        Ok(stored)
    }

    async fn get_survey_response(&self, id: &str) -> Result<StoredResponse, StoreError> {
        let key = object_key(id);
        let object = match self.store.get(&key).await {
            Ok(object) => object,
            Err(object_store::Error::NotFound { .. }) => {
                debug!(key = %key, "No response object");
                return Err(StoreError::NotFound);
            }
            Err(err) => return Err(err.into()),
        };
        let data = object.bytes().await?;
        Ok(serde_json::from_slice(&data)?)
    }

    async fn get_stats(&self) -> Result<Stats, StoreError> {
        Err(StoreError::Unsupported {
            operation: "Stats",
            backend: "s3",
        })
    }
}
