// libs/booking-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_utils::extractor::admin_auth_middleware;

use crate::handlers;
use crate::state::AppState;

pub fn booking_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/specialties", get(handlers::list_active_specialties))
        .route("/availability", get(handlers::get_availability))
        .route(
            "/bookings",
            get(handlers::list_bookings).post(handlers::book_slot),
        )
        .route("/bookings/{slot_id}/cancel", post(handlers::cancel_booking))
        .with_state(state)
}

pub fn admin_routes(state: Arc<AppState>) -> Router {
    let config = Arc::new(state.config.clone());

    Router::new()
        .route("/slots", get(handlers::list_all_slots))
        .route(
            "/specialties",
            get(handlers::list_specialties).post(handlers::add_specialty),
        )
        .route(
            "/specialties/{specialty_id}",
            delete(handlers::remove_specialty),
        )
        .route("/reset", post(handlers::reset_all))
        .layer(middleware::from_fn_with_state(config, admin_auth_middleware))
        .with_state(state)
}
