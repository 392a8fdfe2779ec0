use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};

use catalog_events::{CreateProduct, DeleteProduct, UpdateProduct};

use crate::app::dto::{self, ProductRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::{Guard, authorize};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/create_product", post(create_product))
        .route("/get_product/:sku", get(get_product))
        .route("/update_product/:sku", put(update_product))
        .route("/delete_product/:sku", delete(delete_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<ProductRequest>,
) -> Result<Response, ApiError> {
    authorize(&ctx, Guard::AdminOrSuperAdmin).map_err(ApiError::Rejected)?;

    services.dispatch(CreateProduct::from(body)).await?;
    Ok(dto::message(StatusCode::CREATED, "Product created successfully"))
}

/// Any actor may read; the view is attributed to the caller.
pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(sku): Path<String>,
) -> Result<Response, ApiError> {
    let viewer = ctx.viewer_email().map(str::to_string);
    let product = services.get_product(sku, viewer).await?;
    Ok(Json(product).into_response())
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(sku): Path<String>,
    Json(body): Json<ProductRequest>,
) -> Result<Response, ApiError> {
    authorize(&ctx, Guard::AdminOrSuperAdmin).map_err(ApiError::Rejected)?;

    services
        .dispatch(UpdateProduct { sku, product: body })
        .await?;
    Ok(dto::message(StatusCode::OK, "Product updated successfully"))
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(sku): Path<String>,
) -> Result<Response, ApiError> {
    authorize(&ctx, Guard::AdminOrSuperAdmin).map_err(ApiError::Rejected)?;

    services.dispatch(DeleteProduct { sku }).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
