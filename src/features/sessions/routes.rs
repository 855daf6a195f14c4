use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::features::sessions::handlers;
use crate::features::sessions::services::SessionService;

/// Read-only session routes (no auth required)
pub fn public_routes(service: Arc<SessionService>) -> Router {
    Router::new()
        .route("/api/clubs/{id}/sessions", get(handlers::list_club_sessions))
        .route("/api/sessions/{id}", get(handlers::get_session))
        .route("/api/sessions/{id}/rsvps", get(handlers::list_rsvps))
        .with_state(service)
}

/// Session routes acting on behalf of the caller (require auth middleware to be applied by caller)
pub fn protected_routes(service: Arc<SessionService>) -> Router {
    Router::new()
        .route("/api/clubs/{id}/sessions", post(handlers::create_session))
        .route("/api/sessions/{id}", patch(handlers::reschedule_session))
        .route("/api/sessions/{id}/cancel", post(handlers::cancel_session))
        .route(
            "/api/sessions/{id}/rsvp",
            put(handlers::set_rsvp)
                .delete(handlers::withdraw_rsvp)
                .get(handlers::get_my_rsvp),
        )
        .route("/api/sessions/{id}/check-in", post(handlers::check_in))
        .route("/api/sessions/{id}/attendance", get(handlers::list_attendance))
        .with_state(service)
}
