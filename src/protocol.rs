//! Uniform conversion of handler outcomes into JSON HTTP responses.
//!
//! Handlers return [`Outcome<T>`]. A plain value becomes `200` with the value
//! JSON-encoded. Either side may instead carry an [`HttpPayload`], in which
//! case that status and body are emitted verbatim. Errors without a payload
//! are unexpected: they are logged in full and the client only ever sees a
//! fixed `500` body.

use crate::errors::StoreError;
use crate::models::ValidationErrors;
use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError};
use serde::Serialize;
use serde_json::{Value, json};
use std::error::Error as StdError;
use thiserror::Error;
use tracing::{debug, error};

/// A status code and JSON body that should reach the client as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpPayload {
    pub status: StatusCode,
    pub body: Value,
}

impl HttpPayload {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// `{"status": text}` under the given status code.
    pub fn status_text(status: StatusCode, text: impl Into<String>) -> Self {
        Self::new(status, json!({ "status": text.into() }))
    }

    pub fn into_response(self) -> HttpResponse {
        json_response(self.status, &self.body)
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// An error that already knows how it should look on the wire.
    #[error("HTTP {}", .0.status.as_u16())]
    Http(HttpPayload),

    /// Anything else. Reported to the client as an opaque 500.
    #[error("{0}")]
    Plain(Box<dyn StdError + Send + Sync>),
}

impl ApiError {
    pub fn status_text(status: StatusCode, text: impl Into<String>) -> Self {
        ApiError::Http(HttpPayload::status_text(status, text))
    }

    pub fn plain(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        ApiError::Plain(err.into())
    }

    pub fn not_found() -> Self {
        Self::status_text(StatusCode::NOT_FOUND, "Not Found")
    }

    /// The annotation this error carries, if any.
    pub fn payload(&self) -> Option<&HttpPayload> {
        match self {
            ApiError::Http(payload) => Some(payload),
            ApiError::Plain(_) => None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => {
                debug!("Store reported not found");
                ApiError::status_text(StatusCode::NOT_FOUND, "Response Not Found")
            }
            StoreError::Unsupported { .. } => {
                debug!(reason = %err, "Store reported unsupported operation");
                ApiError::status_text(StatusCode::NOT_IMPLEMENTED, err.to_string())
            }
            other => ApiError::plain(other),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(issues: ValidationErrors) -> Self {
        let body = serde_json::to_value(&issues).unwrap_or_else(|_| json!({}));
        ApiError::Http(HttpPayload::new(StatusCode::BAD_REQUEST, body))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Http(payload) => payload.status,
            ApiError::Plain(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Http(payload) => payload.clone().into_response(),
            ApiError::Plain(err) => {
                error!(error = %err, "Unhandled");
                json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &json!({ "error": "Internal Server Error" }),
                )
            }
        }
    }
}

/// The success side of a handler outcome.
#[derive(Debug)]
pub enum Reply<T> {
    /// Emitted as `200` with the value as JSON.
    Value(T),
    /// A custom envelope that overrides the default status.
    Http(HttpPayload),
}

impl<T: Serialize> Reply<T> {
    pub fn into_response(self) -> HttpResponse {
        match self {
            Reply::Value(value) => json_response(StatusCode::OK, &value),
            Reply::Http(payload) => payload.into_response(),
        }
    }
}

impl<T: Serialize> Responder for Reply<T> {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        self.into_response()
    }
}

pub type Outcome<T> = Result<Reply<T>, ApiError>;

/// Renders a handler outcome. Equivalent to what actix does with an
/// `Outcome<T>` returned from a route.
pub fn render<T: Serialize>(outcome: Outcome<T>) -> HttpResponse {
    match outcome {
        Ok(reply) => reply.into_response(),
        Err(err) => err.error_response(),
    }
}

pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> HttpResponse {
    match serde_json::to_vec(body) {
        Ok(bytes) => HttpResponse::build(status)
            .content_type("application/json")
            .body(bytes),
        Err(err) => {
            error!(error = %err, "Failed to encode response body");
            HttpResponse::InternalServerError()
                .content_type("application/json")
                .body(r#"{"error":"Internal Server Error"}"#)
        }
    }
}
