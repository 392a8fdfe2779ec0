use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

// -------------------------
// Request DTOs
// -------------------------

/// Product body for create/update; the same shape as the stored product.
pub use catalog_events::ProductFields as ProductRequest;

/// User body for register/update. `password` is plaintext on the wire.
pub use catalog_events::UserFields as UserRequest;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub fn message(status: StatusCode, message: &'static str) -> Response {
    (status, Json(MessageResponse { message })).into_response()
}
