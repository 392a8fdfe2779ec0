use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};

use catalog_events::{DeleteUser, MakeUserSuperAdmin, RegisterUser, UpdateUser};

use crate::app::dto::{self, LoginRequest, UserRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::{Guard, authorize};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
        .route("/get_user/:email", get(get_user))
        .route("/update_user/:email", put(update_user))
        .route("/delete_user/:email", delete(delete_user))
        .route("/change_role/:email", put(make_super_admin))
}

/// Only super admins can register users.
pub async fn register_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<UserRequest>,
) -> Result<Response, ApiError> {
    authorize(&ctx, Guard::SuperAdmin).map_err(ApiError::Rejected)?;

    services.dispatch(RegisterUser::from(body)).await?;
    Ok(dto::message(StatusCode::CREATED, "User registered successfully"))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let outcome = services.login(body.email, body.password).await?;
    Ok(Json(outcome).into_response())
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(email): Path<String>,
) -> Result<Response, ApiError> {
    authorize(&ctx, Guard::AdminOrSuperAdmin).map_err(ApiError::Rejected)?;

    let profile = services.get_user(email).await?;
    Ok(Json(profile).into_response())
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(email): Path<String>,
    Json(body): Json<UserRequest>,
) -> Result<Response, ApiError> {
    authorize(&ctx, Guard::SuperAdmin).map_err(ApiError::Rejected)?;

    services
        .dispatch(UpdateUser {
            email,
            new_user: body,
        })
        .await?;
    Ok(dto::message(StatusCode::OK, "User updated successfully"))
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(email): Path<String>,
) -> Result<Response, ApiError> {
    authorize(&ctx, Guard::SuperAdmin).map_err(ApiError::Rejected)?;

    services.dispatch(DeleteUser { email }).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn make_super_admin(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(email): Path<String>,
) -> Result<Response, ApiError> {
    authorize(&ctx, Guard::SuperAdmin).map_err(ApiError::Rejected)?;

    services.dispatch(MakeUserSuperAdmin { email }).await?;
    Ok(dto::message(StatusCode::OK, "User role changed successfully"))
}
