use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use catalog_core::DomainError;
use catalog_infra::DispatchError;

/// Error returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Already rendered (auth/authz rejections).
    #[error("request rejected")]
    Rejected(Response),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Dispatch(e) => dispatch_error_to_response(e),
            ApiError::Domain(e) => domain_error_to_response(e),
            ApiError::Rejected(response) => response,
        }
    }
}

pub fn dispatch_error_to_response(err: DispatchError) -> Response {
    match err {
        DispatchError::Handler(e) => domain_error_to_response(e),
        DispatchError::UnknownMessageType(_) | DispatchError::DuplicateCommandHandler(_) => {
            tracing::error!(error = %err, "message bus misconfigured");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "dispatch_error", err.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::DuplicateKey(msg) => json_error(StatusCode::BAD_REQUEST, "duplicate_key", msg),
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvalidCredentials => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_credentials",
            DomainError::InvalidCredentials.to_string(),
        ),
        DomainError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Internal(msg) => {
            tracing::error!(error = %msg, "internal error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
