//! Handlers for submitting and reading survey responses.
//!
//! Handlers never build HTTP responses themselves. They return an
//! [`Outcome`] and let `crate::protocol` pick the status: validation failures,
//! missing responses and unsupported store operations all arrive there as
//! annotated errors, everything else becomes an opaque 500.

use crate::models::{Response, Stats, StoredResponse};
use crate::protocol::{ApiError, Outcome, Reply};
use crate::store::SurveyStore;
use actix_web::http::StatusCode;
use actix_web::web;
use serde_json::{Value, json};
use tracing::{debug, info};

/// Liveness probe.
///
/// # HTTP Method
/// - `GET /up`
///
/// # Success
/// - Returns HTTP 200 with `{"status":"OK"}`.
pub async fn up() -> Outcome<Value> {
    Ok(Reply::Value(json!({ "status": "OK" })))
}

/// Fallback for every unmatched route.
pub async fn not_found() -> Outcome<()> {
    Err(ApiError::not_found())
}

fn parse_body(body: &[u8]) -> Result<Response, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::status_text(StatusCode::BAD_REQUEST, "Body is required"));
    }
    serde_json::from_slice(body).map_err(|err| {
        debug!(error = %err, "Rejected request body");
        ApiError::status_text(StatusCode::BAD_REQUEST, "Invalid JSON body")
    })
}

/// Validates and stores a new survey response.
///
/// # HTTP Method
/// - `POST /responses`
///
/// # Request
/// - JSON payload conforming to `Response`.
///
/// # Success
/// - Returns HTTP 200 with the `StoredResponse`, including its new `id`.
///
/// # Errors
/// - HTTP 400 with a field → message map if validation fails. The store is
///   not called in that case.
/// - HTTP 400 if the body is missing or is not valid JSON.
/// - HTTP 500 on store failure.
///
/// # Logs
/// - Debug: receipt of the request.
/// - Info: identifier of the stored response.
pub async fn add_response(
    store: web::Data<dyn SurveyStore>,
    body: web::Bytes,
) -> Outcome<StoredResponse> {
    debug!(bytes = body.len(), "POST /responses called");
    let response = parse_body(&body)?;
    response.validate()?;

    let stored = store.add_survey_response(response).await?;
    info!(id = %stored.id, "Stored survey response");
    Ok(Reply::Value(stored))
}

/// Fetches one stored response.
///
/// # HTTP Method
/// - `GET /responses/{id}`
///
/// # Errors
/// - HTTP 404 `{"status":"Response Not Found"}` for unknown identifiers.
/// - HTTP 500 on store failure.
pub async fn get_response(
    store: web::Data<dyn SurveyStore>,
    id: web::Path<String>,
) -> Outcome<StoredResponse> {
    let id = id.into_inner();
    debug!(id = %id, "GET /responses/{{id}} called");
    Ok(Reply::Value(store.get_survey_response(&id).await?))
}

/// Reports how many responses are stored.
///
/// # HTTP Method
/// - `GET /stats`
///
/// # Errors
/// - HTTP 501 if the configured store cannot count responses.
/// - HTTP 500 on store failure.
pub async fn get_stats(store: web::Data<dyn SurveyStore>) -> Outcome<Stats> {
    let stats = store.get_stats().await?;
    debug!(count = stats.count, "Computed stats");
    Ok(Reply::Value(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::handlers::configure;
    use crate::models::AnimalResponse;
    use crate::store::MockSurveyStore;
    use actix_web::{App, test};
    use std::sync::Arc;

    fn stored(id: &str, age: i64) -> StoredResponse {
        StoredResponse::new(
            id.to_string(),
            Response {
                age,
                ..Default::default()
            },
        )
    }

    fn data(mock: MockSurveyStore) -> web::Data<dyn SurveyStore> {
        let store: Arc<dyn SurveyStore> = Arc::new(mock);
        web::Data::from(store)
    }

    macro_rules! app {
        ($mock:expr) => {
            test::init_service(App::new().app_data(data($mock)).configure(configure)).await
        };
    }

    #[actix_web::test]
    async fn test_up_and_unknown_route() {
        let app = app!(MockSurveyStore::new());

        let resp = test::call_service(&app, test::TestRequest::get().uri("/up").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"status": "OK"}));

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/frobnork").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"status": "Not Found"}));

        let resp =
            test::call_service(&app, test::TestRequest::delete().uri("/up").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_add_response() {
        let mut mock = MockSurveyStore::new();
        mock.expect_add_survey_response()
            .withf(|response| {
                response.age == 10
                    && response.animals.get("dog") == Some(&AnimalResponse { rating: 10, owned: 50 })
            })
            .times(1)
            .returning(|_| Box::pin(async { Ok(stored("storedID", 10)) }));
        let app = app!(mock);

        let req = test::TestRequest::post()
            .uri("/responses")
            .set_json(json!({"age": 10, "animals": {"dog": {"rating": 10, "owned": 50}}}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let got: StoredResponse = test::read_body_json(resp).await;
        assert_eq!(got.id, "storedID");
        assert_eq!(got.response.age, 10);
    }

    #[actix_web::test]
    async fn test_validation_error_skips_store() {
        let mut mock = MockSurveyStore::new();
        mock.expect_add_survey_response().never();
        let app = app!(mock);

        let req = test::TestRequest::post()
            .uri("/responses")
            .set_json(json!({"age": -1}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body.get("age").is_some(), "expecting an error for age, got {}", body);
    }

    #[actix_web::test]
    async fn test_null_animals_is_stored_as_empty() {
        let mut mock = MockSurveyStore::new();
        mock.expect_add_survey_response()
            .withf(|response| response.age == 5 && response.animals.is_empty())
            .times(1)
            .returning(|_| Box::pin(async { Ok(stored("nullAnimals", 5)) }));
        let app = app!(mock);

        let req = test::TestRequest::post()
            .uri("/responses")
            .set_json(json!({"age": 5, "animals": null}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let got: StoredResponse = test::read_body_json(resp).await;
        assert_eq!(got.id, "nullAnimals");
    }

    #[actix_web::test]
    async fn test_oversized_numbers_get_field_errors() {
        let mut mock = MockSurveyStore::new();
        mock.expect_add_survey_response().never();
        let app = app!(mock);

        let req = test::TestRequest::post()
            .uri("/responses")
            .set_json(json!({
                "age": 3_000_000_000_i64,
                "animals": {"dog": {"rating": 99_999_999_999_i64}}
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({
                "age": "Must be between 0 and 150",
                "animals.dog.rating": "Must be between 0 and 10"
            })
        );
    }

    #[actix_web::test]
    async fn test_missing_and_malformed_body() {
        let mut mock = MockSurveyStore::new();
        mock.expect_add_survey_response().never();
        let app = app!(mock);

        let resp =
            test::call_service(&app, test::TestRequest::post().uri("/responses").to_request())
                .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"status": "Body is required"}));

        let req = test::TestRequest::post()
            .uri("/responses")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"age\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"status": "Invalid JSON body"}));
    }

    #[actix_web::test]
    async fn test_get_response_not_found() {
        let mut mock = MockSurveyStore::new();
        mock.expect_get_survey_response()
            .times(1)
            .returning(|_| Box::pin(async { Err(StoreError::NotFound) }));
        let app = app!(mock);

        let req = test::TestRequest::get().uri("/responses/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"status": "Response Not Found"}));
    }

    #[actix_web::test]
    async fn test_get_response_found() {
        let mut mock = MockSurveyStore::new();
        mock.expect_get_survey_response()
            .withf(|id| id == "abc")
            .times(1)
            .returning(|_| Box::pin(async { Ok(stored("abc", 70)) }));
        let app = app!(mock);

        let req = test::TestRequest::get().uri("/responses/abc").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"id": "abc", "age": 70, "animals": {}}));
    }

    #[actix_web::test]
    async fn test_stats_unsupported_and_failing() {
        let mut mock = MockSurveyStore::new();
        let mut calls = 0;
        mock.expect_get_stats().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Box::pin(async {
                    Err(StoreError::Unsupported {
                        operation: "Stats",
                        backend: "s3",
                    })
                })
            } else {
                Box::pin(async {
                    Err(StoreError::Serialization(
                        serde_json::from_str::<Value>("]").unwrap_err(),
                    ))
                })
            }
        });
        let app = app!(mock);

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/stats").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/stats").to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": "Internal Server Error"}));
    }
}
