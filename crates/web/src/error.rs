use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use storage::{ErrorKind, RegistryError};

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Registry(RegistryError),
    BadRequest(String),
    Unauthorized(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "Registry error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
        }
    }
}

impl WebError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Registry(e) => match e.kind() {
                ErrorKind::InvalidInput => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                ErrorKind::InactiveResource => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "INACTIVE_RESOURCE")
                }
                ErrorKind::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
                ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status_code, code) = self.status_and_code();

        let message = match &self {
            Self::Registry(e) if e.kind() == ErrorKind::Internal => {
                tracing::error!("Registry error: {:?}", e);
                "An internal error occurred".to_string()
            }
            Self::Registry(e) => e.to_string(),
            Self::BadRequest(msg) | Self::Unauthorized(msg) => msg.clone(),
        };

        (
            status_code,
            Json(json!({
                "error": message,
                "code": code
            })),
        )
            .into_response()
    }
}

impl From<RegistryError> for WebError {
    fn from(error: RegistryError) -> Self {
        Self::Registry(error)
    }
}

impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, WebError>;
