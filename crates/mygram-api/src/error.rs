use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use mygram_db::DbError;
use mygram_types::api::{ErrorDetail, FailureEnvelope};

/// Every way a request can fail. Each kind maps to exactly one status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// One message per violated field rule, in field declaration order.
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("missing or malformed authorization header")]
    NotAuthorized,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("you are not the owner of this {0}")]
    ForbiddenAccess(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("invalid email or password")]
    InvalidEmailOrPassword,

    /// The payload is the cause, logged but never sent to the client.
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotAuthorized
            | ApiError::InvalidToken
            | ApiError::InvalidEmailOrPassword => StatusCode::UNAUTHORIZED,
            ApiError::ForbiddenAccess(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> ErrorDetail {
        match self {
            ApiError::Validation(messages) => ErrorDetail::Fields(messages.clone()),
            other => ErrorDetail::Message(other.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => ApiError::NotFound("resource"),
            DbError::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(cause) = &self {
            error!("Internal error: {}", cause);
        }

        let status = self.status();
        let body = FailureEnvelope {
            code: status.as_u16(),
            message: status.canonical_reason().unwrap_or_default().to_string(),
            error: self.detail(),
        };

        (status, Json(body)).into_response()
    }
}
