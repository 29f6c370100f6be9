//! HTTP surface of the employee service.
//!
//! Every operation reports failures as an [`ApiError`]. The error is turned
//! into a status code by the configured [`StatusPolicy`] at the point where
//! the operation returns, and the response body is plain text: the raw
//! store error for server failures, a short fixed message otherwise.

pub mod employee;
pub mod router;
pub mod state;

use crate::core::{ObjectIdError, StoreError};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clap::ValueEnum;
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

pub use router::build_router;
pub use state::AppState;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body could not be decoded into a record
    #[error("{0}")]
    MalformedPayload(String),

    /// Path identifier is not a well-formed object id
    #[error("Invalid employee ID")]
    InvalidIdentifier(#[source] ObjectIdError),

    #[error("employee not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedPayload(rejection.body_text())
    }
}

impl From<ObjectIdError> for ApiError {
    fn from(err: ObjectIdError) -> Self {
        Self::InvalidIdentifier(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
    Health,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Health => "health",
        };
        f.write_str(name)
    }
}

/// How client-side failures map to status codes.
///
/// `Legacy` keeps the historical codes: a malformed create body is a 500
/// and an update of an unknown record is a 400. `Strict` reports both as
/// client errors (400 and 404).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StatusPolicy {
    #[default]
    Legacy,
    Strict,
}

impl StatusPolicy {
    pub fn status_for(self, operation: Operation, err: &ApiError) -> StatusCode {
        match err {
            ApiError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MalformedPayload(_) => match (self, operation) {
                (Self::Legacy, Operation::Create) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            ApiError::NotFound => match (self, operation) {
                (Self::Legacy, Operation::Update) => StatusCode::BAD_REQUEST,
                _ => StatusCode::NOT_FOUND,
            },
        }
    }

    pub fn reject(self, operation: Operation, err: ApiError) -> Rejection {
        let status = self.status_for(operation, &err);
        if status.is_server_error() {
            error!(%operation, status = status.as_u16(), error = %err, "request failed");
        } else {
            warn!(%operation, status = status.as_u16(), error = %err, "request rejected");
        }

        Rejection {
            status,
            message: err.to_string(),
        }
    }
}

/// Failed operation outcome, written as a `text/plain` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn malformed() -> ApiError {
        ApiError::MalformedPayload("bad body".to_string())
    }

    #[test]
    fn legacy_policy_keeps_historical_codes() {
        let policy = StatusPolicy::Legacy;
        assert_eq!(
            policy.status_for(Operation::Create, &malformed()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            policy.status_for(Operation::Update, &malformed()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            policy.status_for(Operation::Update, &ApiError::NotFound),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            policy.status_for(Operation::Delete, &ApiError::NotFound),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn strict_policy_reports_client_errors() {
        let policy = StatusPolicy::Strict;
        assert_eq!(
            policy.status_for(Operation::Create, &malformed()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            policy.status_for(Operation::Update, &ApiError::NotFound),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn identifier_and_store_errors_ignore_policy() {
        for policy in [StatusPolicy::Legacy, StatusPolicy::Strict] {
            let invalid = ApiError::from(ObjectIdError::InvalidLength(3));
            assert_eq!(
                policy.status_for(Operation::Delete, &invalid),
                StatusCode::BAD_REQUEST
            );

            let store = ApiError::from(StoreError::Closed);
            assert_eq!(
                policy.status_for(Operation::List, &store),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[test]
    fn rejection_carries_error_text() {
        let rejection = StatusPolicy::Legacy.reject(
            Operation::List,
            ApiError::from(StoreError::Connection("connection refused".to_string())),
        );
        assert_eq!(rejection.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(rejection.message, "connection error: connection refused");

        let rejection = StatusPolicy::Legacy.reject(
            Operation::Delete,
            ApiError::from(ObjectIdError::InvalidLength(3)),
        );
        assert_eq!(rejection.message, "Invalid employee ID");
    }
}
