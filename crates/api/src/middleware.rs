use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use catalog_auth::Actor;
use catalog_core::DomainError;

use crate::app::{AppServices, errors};
use crate::context::ActorContext;

#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
}

/// Resolve the request's [`ActorContext`].
///
/// No `Authorization` header means anonymous. A header that is present but
/// malformed, expired or badly signed is rejected with 401, and so is a
/// valid token whose user no longer exists. The role comes from the stored
/// user, not from the token, so deletions and role changes apply at once.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let actor = match extract_bearer(req.headers())? {
        None => ActorContext::anonymous(),
        Some(token) => {
            let claims = state.services.tokens().verify(token, Utc::now()).map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", e.to_string())
            })?;

            let user = match state.services.get_user(claims.sub.clone()).await {
                Ok(user) => user,
                Err(DomainError::NotFound(_)) => {
                    tracing::debug!(email = %claims.sub, "token subject no longer exists");
                    return Err(errors::json_error(
                        StatusCode::UNAUTHORIZED,
                        "unauthorized",
                        "Invalid token",
                    ));
                }
                Err(e) => return Err(errors::domain_error_to_response(e)),
            };
            ActorContext::new(Actor::new(user.email, user.role))
        }
    };

    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, Response> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let token = header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "Invalid token")
        })?;

    Ok(Some(token))
}
