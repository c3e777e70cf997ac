use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::config::schema::{BasicMockConfig, MockRuleConfig, RouteConfig};
use crate::http::error::json_error;
use crate::http::server::AppState;
use crate::store::StoreError;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub routes: usize,
    pub mock_rules: usize,
    pub basic_mock_rules: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        routes: state.store.routes().len(),
        mock_rules: state.store.mocks().len(),
        basic_mock_rules: state.store.basic_mocks().len(),
    })
}

// --- Routes ---

pub async fn list_routes(State(state): State<AppState>) -> Response {
    Json(state.store.routes()).into_response()
}

pub async fn create_route(
    State(state): State<AppState>,
    Json(payload): Json<RouteConfig>,
) -> Response {
    match state.store.insert_route(payload) {
        Ok(route) => (StatusCode::CREATED, Json(route)).into_response(),
        Err(error) => store_error(error),
    }
}

pub async fn update_route(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<RouteConfig>,
) -> Response {
    match state.store.update_route(id, payload) {
        Ok(route) => Json(route).into_response(),
        Err(error) => store_error(error),
    }
}

pub async fn delete_route(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match state.store.delete_route(id) {
        Ok(route) => Json(route).into_response(),
        Err(error) => store_error(error),
    }
}

// --- Audit log views ---

#[derive(Deserialize)]
pub struct LogQuery {
    #[serde(default = "default_log_limit")]
    pub limit: usize,
}

fn default_log_limit() -> usize {
    50
}

pub async fn route_logs(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<LogQuery>,
) -> Response {
    if state.store.route_by_id(id).is_none() {
        return store_error(StoreError::UnknownRoute(id));
    }
    Json(state.sink.recent_for_route(id, query.limit)).into_response()
}

pub async fn log_details(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match state.sink.find(id) {
        Some(record) => Json(record).into_response(),
        None => json_error(StatusCode::NOT_FOUND, format!("no exchange record with id {id}")),
    }
}

pub async fn clear_route_logs(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    if state.store.route_by_id(id).is_none() {
        return store_error(StoreError::UnknownRoute(id));
    }
    let cleared = state.sink.clear_for_route(id);
    Json(serde_json::json!({ "cleared": cleared })).into_response()
}

// --- Mock rules (body-matching table) ---

pub async fn list_mocks(State(state): State<AppState>) -> Response {
    Json(state.store.mocks()).into_response()
}

pub async fn create_mock(
    State(state): State<AppState>,
    Json(payload): Json<MockRuleConfig>,
) -> Response {
    match state.store.insert_mock(payload) {
        Ok(rule) => (StatusCode::CREATED, Json(rule)).into_response(),
        Err(error) => store_error(error),
    }
}

pub async fn delete_mock(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match state.store.delete_mock(id) {
        Ok(rule) => Json(rule).into_response(),
        Err(error) => store_error(error),
    }
}

// --- Mock rules (body-ignoring table) ---

pub async fn list_basic_mocks(State(state): State<AppState>) -> Response {
    Json(state.store.basic_mocks()).into_response()
}

pub async fn create_basic_mock(
    State(state): State<AppState>,
    Json(payload): Json<BasicMockConfig>,
) -> Response {
    match state.store.insert_basic_mock(payload) {
        Ok(rule) => (StatusCode::CREATED, Json(rule)).into_response(),
        Err(error) => store_error(error),
    }
}

pub async fn delete_basic_mock(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match state.store.delete_basic_mock(id) {
        Ok(rule) => Json(rule).into_response(),
        Err(error) => store_error(error),
    }
}

fn store_error(error: StoreError) -> Response {
    let status = match error {
        StoreError::DuplicateSourcePattern(_) | StoreError::DuplicateMockRule { .. } => {
            StatusCode::CONFLICT
        }
        StoreError::UnknownRoute(_) | StoreError::UnknownMock(_) => StatusCode::NOT_FOUND,
        StoreError::StatusOutOfRange(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    json_error(status, error.to_string())
}
