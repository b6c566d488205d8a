//! MongoDB-backed survey store.
//!
//! Each response is one document in the `surveys` collection, with its
//! identifier as `_id` and the response fields stored inline.

use crate::errors::StoreError;
use crate::models::{AnimalResponse, Response, Stats, StoredResponse};
use crate::store::{SurveyStore, new_response_id};
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

const COLLECTION: &str = "surveys";

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ResponseDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    animals: BTreeMap<String, AnimalResponse>,
    #[serde(default)]
    age: i64,
}

impl From<StoredResponse> for ResponseDocument {
    fn from(stored: StoredResponse) -> Self {
        Self {
            id: stored.id,
            animals: stored.response.animals,
            age: stored.response.age,
        }
    }
}

impl From<ResponseDocument> for StoredResponse {
    fn from(document: ResponseDocument) -> Self {
        StoredResponse::new(
            document.id,
            Response {
                animals: document.animals,
                age: document.age,
            },
        )
    }
}

/// The client is cheap to clone and pools its own connections.
#[derive(Clone, Debug)]
pub struct MongoStore {
    client: Client,
    db_name: String,
}

impl MongoStore {
    pub fn new(client: Client, db_name: impl Into<String>) -> Self {
        Self {
            client,
            db_name: db_name.into(),
        }
    }

    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        info!(db_name, "MongoDB client ready");
        Ok(Self::new(client, db_name))
    }

    fn collection(&self) -> Collection<ResponseDocument> {
        self.client.database(&self.db_name).collection(COLLECTION)
    }
}

#[async_trait]
impl SurveyStore for MongoStore {
    async fn add_survey_response(&self, response: Response) -> Result<StoredResponse, StoreError> {
        let stored = StoredResponse::new(new_response_id(), response);
        self.collection()
            .insert_one(ResponseDocument::from(stored.clone()))
            .await?;
        debug!(id = %stored.id, "Inserted response document");
        Ok(stored)
    }

    async fn get_survey_response(&self, id: &str) -> Result<StoredResponse, StoreError> {
        match self.collection().find_one(doc! { "_id": id }).await? {
            Some(document) => Ok(document.into()),
            None => {
                debug!(id, "No response document");
                Err(StoreError::NotFound)
            }
        }
    }

    async fn get_stats(&self) -> Result<Stats, StoreError> {
        let count = self.collection().count_documents(doc! {}).await?;
        Ok(Stats { count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn document_uses_id_as_primary_key() {
        let mut response = Response {
            age: 33,
            ..Default::default()
        };
        response
            .animals
            .insert("cat".to_string(), AnimalResponse { rating: 7, owned: 2 });
        let stored = StoredResponse::new("abc".to_string(), response);

        let document = bson::to_document(&ResponseDocument::from(stored.clone())).unwrap();
        assert_eq!(document.get_str("_id").unwrap(), "abc");
        assert_eq!(document.get_i64("age").unwrap(), 33);
        assert!(document.get("id").is_none());

        let back: ResponseDocument = bson::from_document(document).unwrap();
        assert_eq!(StoredResponse::from(back), stored);
    }
}
