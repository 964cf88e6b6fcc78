use std::sync::Arc;

use axum::{routing::get, Router};

use booking_cell::{admin_routes, booking_routes, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Agenda Concurrente API is running!" }))
        .nest("/api", booking_routes(state.clone()))
        .nest("/api/admin", admin_routes(state))
}
