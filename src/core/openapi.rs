use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::core::error::RejectionReason;
use crate::features::auth::{self, model::AuthenticatedUser};
use crate::features::clubs::{dtos as clubs_dtos, handlers as clubs_handlers, models as clubs_models};
use crate::features::sessions::{
    dtos as sessions_dtos, handlers as sessions_handlers, models as sessions_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::get_me,
        // Clubs
        clubs_handlers::search_nearby,
        clubs_handlers::get_club,
        clubs_handlers::grant_club_admin,
        // Sessions
        sessions_handlers::create_session,
        sessions_handlers::list_club_sessions,
        sessions_handlers::get_session,
        sessions_handlers::reschedule_session,
        sessions_handlers::cancel_session,
        // RSVPs and check-in
        sessions_handlers::set_rsvp,
        sessions_handlers::withdraw_rsvp,
        sessions_handlers::get_my_rsvp,
        sessions_handlers::list_rsvps,
        sessions_handlers::check_in,
        sessions_handlers::list_attendance,
    ),
    components(
        schemas(
            // Shared
            Meta,
            RejectionReason,
            // Auth
            ApiResponse<AuthenticatedUser>,
            // Clubs
            clubs_models::ClubRole,
            clubs_dtos::GrantClubAdminDto,
            ApiResponse<Vec<clubs_dtos::NearbyClubDto>>,
            ApiResponse<clubs_dtos::ClubResponseDto>,
            // Sessions
            sessions_models::RsvpStatus,
            sessions_models::CheckInMethod,
            sessions_dtos::CreateSessionDto,
            sessions_dtos::RescheduleSessionDto,
            sessions_dtos::SetRsvpDto,
            sessions_dtos::CheckInDto,
            ApiResponse<sessions_dtos::SessionResponseDto>,
            ApiResponse<Vec<sessions_dtos::SessionResponseDto>>,
            ApiResponse<sessions_dtos::SessionDetailDto>,
            ApiResponse<sessions_dtos::RsvpResponseDto>,
            ApiResponse<Vec<sessions_dtos::RsvpResponseDto>>,
            ApiResponse<sessions_dtos::AttendanceResponseDto>,
            ApiResponse<Vec<sessions_dtos::AttendanceResponseDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Identity of the calling user"),
        (name = "clubs", description = "Club directory and nearby search"),
        (name = "sessions", description = "Club session scheduling"),
        (name = "rsvps", description = "RSVPs, check-in and attendance"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "UWH Clubs API",
        version = "0.1.0",
        description = "API documentation for the underwater hockey club platform",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_session_paths() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/clubs/nearby"));
        assert!(doc.paths.paths.contains_key("/api/sessions/{id}/rsvp"));
        assert!(doc.paths.paths.contains_key("/api/sessions/{id}/check-in"));
    }
}
