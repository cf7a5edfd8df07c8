use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cqrs_es::{persist::PersistenceError, AggregateError};
use domain::{validation::Violations, Error};
use serde_json::json;

/// Error body: `{ "error": "...", "fields": [{ "field", "reason" }] }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub fields: Violations,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: Violations::default(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Uniqueness { .. } | Error::InvalidStateTransition { .. } => StatusCode::CONFLICT,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Authentication { .. } => StatusCode::UNAUTHORIZED,
            Error::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("{}", err);
        }

        let message = err.to_string();
        let fields = match err {
            Error::Validation(violations) => violations,
            _ => Violations::default(),
        };
        Self {
            status,
            message,
            fields,
        }
    }
}

impl From<AggregateError<Error>> for ApiError {
    fn from(err: AggregateError<Error>) -> Self {
        match err {
            AggregateError::UserError(err) => err.into(),
            AggregateError::AggregateConflict => {
                Self::new(StatusCode::CONFLICT, "Quote was modified concurrently, retry")
            }
            other => {
                tracing::error!("Command failed: {}", other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        tracing::error!("View load failed: {}", err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.message,
            "fields": self.fields,
        });
        (self.status, Json(body)).into_response()
    }
}
