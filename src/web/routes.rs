use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::app_state::AppState;

use super::handlers;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        .route("/camera/toggle", post(handlers::camera_toggle))
        .route("/scan", post(handlers::scan))
        .route("/preview", get(handlers::preview))
        .with_state(state)
}
