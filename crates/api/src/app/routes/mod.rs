use axum::Router;

pub mod products;
pub mod system;
pub mod users;

/// Router for every catalog endpoint (actor context required).
pub fn router() -> Router {
    Router::new()
        .nest("/product", products::router())
        .nest("/user", users::router())
}
