//! Problem-details responses (`application/problem+json`) for every failure
//! the HTTP boundary reports.

use crate::validation::ValidationErrors;
use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use rocketstore::ErrorCode;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::error;
use utoipa::ToSchema;

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";
pub const VALIDATION_TITLE: &str = "One or more validation errors occurred.";

#[derive(Debug, Serialize, ToSchema)]
pub struct ProblemDetails {
    /// Error code name, or a fixed title for validation and transport failures
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub status: u16,
    /// Validation messages keyed by field, such as `Customer.Name`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

/// Error half of every endpoint's return type
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    problem: ProblemDetails,
}

impl ApiError {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status,
            problem: ProblemDetails {
                title: title.into(),
                detail: Some(detail.into()),
                status: status.as_u16(),
                errors: None,
            },
        }
    }

    /// A failed operation result: the code's name becomes the title.
    pub fn failure<C: ErrorCode>(status: StatusCode, code: C, description: impl Into<String>) -> Self {
        Self::new(status, code.name(), description)
    }

    pub fn validation(errors: &ValidationErrors) -> Self {
        let status = StatusCode::BAD_REQUEST;
        Self {
            status,
            problem: ProblemDetails {
                title: VALIDATION_TITLE.to_string(),
                detail: None,
                status: status.as_u16(),
                errors: Some(
                    errors
                        .by_field()
                        .into_iter()
                        .map(|(field, messages)| (field.to_string(), messages))
                        .collect(),
                ),
            },
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BadRequest", detail)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<shared::Error> for ApiError {
    fn from(err: shared::Error) -> Self {
        match err {
            shared::Error::Cancelled => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "RequestCancelled",
                "The request was cancelled before it completed.",
            ),
            other => {
                error!("Request failed: {}", other);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    "An unexpected error occurred.",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, PROBLEM_CONTENT_TYPE)],
            Json(self.problem),
        )
            .into_response()
    }
}
