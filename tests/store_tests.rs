//! Contract checks every survey store must pass.

use std::collections::BTreeMap;
use std::env;
use survey_api::errors::StoreError;
use survey_api::models::{AnimalResponse, Response};
use survey_api::store::{BlobStore, MongoStore, SqliteStore, SurveyStore, new_response_id};

fn sample_response() -> Response {
    let mut animals = BTreeMap::new();
    animals.insert("cat".to_string(), AnimalResponse { rating: 9, owned: 2 });
    animals.insert("snake".to_string(), AnimalResponse { rating: 0, owned: 0 });
    Response { animals, age: 27 }
}

async fn round_trip(store: &dyn SurveyStore) {
    let input = sample_response();
    let stored = store.add_survey_response(input.clone()).await.unwrap();
    assert!(!stored.id.is_empty());
    assert_eq!(stored.response, input);

    let fetched = store.get_survey_response(&stored.id).await.unwrap();
    assert_eq!(fetched, stored);
}

async fn ids_are_unique(store: &dyn SurveyStore) {
    let first = store.add_survey_response(sample_response()).await.unwrap();
    let second = store.add_survey_response(sample_response()).await.unwrap();
    assert_ne!(first.id, second.id);
}

async fn unknown_id_is_not_found(store: &dyn SurveyStore) {
    let err = store.get_survey_response(&new_response_id()).await.unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got {:?}", err);
}

#[actix_rt::test]
async fn test_sqlite_store_contract() {
    let store = SqliteStore::in_memory().unwrap();
    round_trip(&store).await;
    ids_are_unique(&store).await;
    unknown_id_is_not_found(&store).await;
    assert_eq!(store.get_stats().await.unwrap().count, 3);
}

#[actix_rt::test]
async fn test_sqlite_store_persists_across_pools() {
    let dir = env::temp_dir().join(format!("survey-api-{}", new_response_id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("surveys.db");
    let path = path.to_str().unwrap();

    let id = {
        let store = SqliteStore::open(path).unwrap();
        store.add_survey_response(sample_response()).await.unwrap().id
    };

    let reopened = SqliteStore::open(path).unwrap();
    assert_eq!(reopened.get_survey_response(&id).await.unwrap().id, id);
    assert_eq!(reopened.get_stats().await.unwrap().count, 1);

    drop(reopened);
    let _ = std::fs::remove_dir_all(&dir);
}

#[actix_rt::test]
async fn test_blob_store_contract() {
    let store = BlobStore::in_memory();
    round_trip(&store).await;
    ids_are_unique(&store).await;
    unknown_id_is_not_found(&store).await;

    let err = store.get_stats().await.unwrap_err();
    assert!(err.is_unsupported(), "expected Unsupported, got {:?}", err);
    assert!(matches!(
        err,
        StoreError::Unsupported {
            backend: "s3",
            ..
        }
    ));
}

/// Needs a reachable server, e.g. `MONGODB_TEST_URL=mongodb://localhost:27017`.
#[actix_rt::test]
async fn test_mongo_store_contract() {
    let Ok(uri) = env::var("MONGODB_TEST_URL") else {
        eprintln!("MONGODB_TEST_URL not set, skipping");
        return;
    };
    let db_name = format!("survey_test_{}", new_response_id().replace('-', ""));
    let store = MongoStore::connect(&uri, &db_name).await.unwrap();

    round_trip(&store).await;
    ids_are_unique(&store).await;
    unknown_id_is_not_found(&store).await;
    assert_eq!(store.get_stats().await.unwrap().count, 3);
}
