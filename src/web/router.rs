use super::employee::{create_employee, delete_employee, list_employees, update_employee};
use super::{ApiError, AppState, Operation, Rejection};
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::{get, put};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/employee", get(list_employees).post(create_employee))
        .route("/employee/:id", put(update_employee).delete(delete_employee))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthcheck(State(state): State<AppState>) -> Result<Json<&'static str>, Rejection> {
    state
        .db
        .ping()
        .await
        .map(|()| Json("ok"))
        .map_err(|err| state.reject(Operation::Health, ApiError::from(err)))
}
