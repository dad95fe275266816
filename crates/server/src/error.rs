//! HTTP error responses.
//!
//! Every failing endpoint returns an [`ApiError`]: a status code plus a JSON
//! body with a stable machine-readable code and a human-readable message.
//! Pipeline errors map onto statuses by who is at fault: the client (400,
//! 422), an upstream collaborator (502), or the server itself (500).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use articlebite_core::ArticleBiteError;

use crate::store::StoreError;

/// JSON body of a failed request.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// Stable machine-readable error code.
    pub error: String,
    /// Human-readable description.
    pub message: String,
}

/// An API error carrying its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody { error: error.into(), message: message.into() },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn no_cards(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "no_cards", message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "upstream_failure", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ArticleBiteError> for ApiError {
    fn from(err: ArticleBiteError) -> Self {
        match &err {
            ArticleBiteError::NoCards => {
                Self::no_cards("no usable content: the source yielded zero notecards")
            }
            ArticleBiteError::InvalidRequest(_) | ArticleBiteError::InvalidSource(_) => {
                Self::bad_request(err.to_string())
            }
            ArticleBiteError::Http(_)
            | ArticleBiteError::Timeout { .. }
            | ArticleBiteError::Acquisition(_)
            | ArticleBiteError::Completion { .. }
            | ArticleBiteError::Summarization(_)
            | ArticleBiteError::Generation { .. } => Self::bad_gateway(err.to_string()),
            ArticleBiteError::Serialize(_) | ArticleBiteError::Io(_) => {
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::internal(err.to_string())
    }
}
