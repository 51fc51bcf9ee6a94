use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::domain::AlreadyDecided;
use super::repository::{RepositoryError, ResumeStoreError};
use crate::auth::AuthError;

/// Error raised by the board services.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("email already registered")]
    EmailTaken,
    #[error("already applied to this job")]
    AlreadyApplied,
    #[error(transparent)]
    AlreadyDecided(#[from] AlreadyDecided),
    #[error("resume exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
    #[error("unsupported resume type '{0}'")]
    UnsupportedMediaType(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    ResumeStore(#[from] ResumeStoreError),
}

impl BoardError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            BoardError::Auth(AuthError::Forbidden { .. }) => StatusCode::FORBIDDEN,
            BoardError::Auth(AuthError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
            BoardError::Auth(_) => StatusCode::UNAUTHORIZED,
            BoardError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BoardError::NotFound(_) | BoardError::Repository(RepositoryError::NotFound) => {
                StatusCode::NOT_FOUND
            }
            BoardError::EmailTaken
            | BoardError::AlreadyApplied
            | BoardError::AlreadyDecided(_)
            | BoardError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            BoardError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            BoardError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            BoardError::Repository(RepositoryError::Unavailable(_))
            | BoardError::ResumeStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Extractor rejections carry axum's plain-text body; fold them into the JSON error shape.
impl From<JsonRejection> for BoardError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for BoardError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for BoardError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
