//! Errors returned by handlers and how they look on the wire.
//!
//! Every response error body has a single `detail` key: a message for
//! not-found and server errors, a list of field errors for validation.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{ErrorKind, FieldError, ValidationError};
use thiserror::Error;

use crate::db::StorageError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Task with id {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// An extractor failure that is not about the caller's data,
    /// e.g. an unreadable body.
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },
}

#[derive(Debug, Serialize)]
struct ErrorBody<T> {
    detail: T,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(error) => {
                tracing::debug!(%error, "rejected invalid input");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(ErrorBody {
                        detail: error.into_errors(),
                    }),
                )
                    .into_response()
            }
            Self::NotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    detail: self.to_string(),
                }),
            )
                .into_response(),
            Self::Storage(error) => {
                tracing::error!(%error, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        detail: "Internal server error",
                    }),
                )
                    .into_response()
            }
            Self::Rejected { status, detail } => {
                (status, Json(ErrorBody { detail })).into_response()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match &rejection {
            JsonRejection::JsonDataError(_) => ErrorKind::TypeError,
            JsonRejection::JsonSyntaxError(_) | JsonRejection::MissingJsonContentType(_) => {
                ErrorKind::JsonInvalid
            }
            _ => {
                return Self::Rejected {
                    status: rejection.status(),
                    detail: rejection.body_text(),
                }
            }
        };
        ValidationError::single(FieldError::new(["body"], rejection.body_text(), kind)).into()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(error) => ValidationError::single(
                FieldError::new(["path", "id"], error.body_text(), ErrorKind::IntParsing),
            )
            .into(),
            other => Self::Rejected {
                status: other.status(),
                detail: other.body_text(),
            },
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ValidationError::single(FieldError::new(
            ["query"],
            rejection.body_text(),
            ErrorKind::IntParsing,
        ))
        .into()
    }
}
