//! Admin REST surface: route and mock CRUD plus audit log views.
//!
//! Guarded by a bearer token; disabled unless configured on.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{delete, get, put},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/routes", get(list_routes).post(create_route))
        .route("/admin/routes/{id}", put(update_route).delete(delete_route))
        .route(
            "/admin/routes/{id}/logs",
            get(route_logs).delete(clear_route_logs),
        )
        .route("/admin/logs/{id}", get(log_details))
        .route("/admin/mocks", get(list_mocks).post(create_mock))
        .route("/admin/mocks/{id}", delete(delete_mock))
        .route(
            "/admin/basic-mocks",
            get(list_basic_mocks).post(create_basic_mock),
        )
        .route("/admin/basic-mocks/{id}", delete(delete_basic_mock))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .with_state(state)
}
