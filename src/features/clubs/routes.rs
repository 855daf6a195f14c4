use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::clubs::handlers;
use crate::features::clubs::services::ClubService;

/// Public club directory routes
pub fn routes(service: Arc<ClubService>) -> Router {
    Router::new()
        // Static segment must be registered alongside the {id} route
        .route("/api/clubs/nearby", get(handlers::search_nearby))
        .route("/api/clubs/{id}", get(handlers::get_club))
        .with_state(service)
}

/// Super admin club management routes (require auth middleware to be applied by caller)
pub fn admin_routes(service: Arc<ClubService>) -> Router {
    Router::new()
        .route("/api/admin/clubs/{id}/admins", put(handlers::grant_club_admin))
        .with_state(service)
}
