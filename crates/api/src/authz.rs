//! Route-level role guards.
//!
//! Authorization happens here, before anything reaches the message bus.

use axum::http::StatusCode;
use axum::response::Response;

use catalog_auth::{require_admin_or_super_admin, require_super_admin};

use crate::app::errors;
use crate::context::ActorContext;

/// Role required by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    AdminOrSuperAdmin,
    SuperAdmin,
}

pub fn authorize(ctx: &ActorContext, guard: Guard) -> Result<(), Response> {
    let result = match guard {
        Guard::AdminOrSuperAdmin => require_admin_or_super_admin(ctx.actor()),
        Guard::SuperAdmin => require_super_admin(ctx.actor()),
    };

    result.map_err(|e| {
        tracing::debug!(error = ?e, "forbidden");
        errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string())
    })
}
