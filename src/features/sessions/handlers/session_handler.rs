use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::sessions::dtos::{
    CreateSessionDto, ListSessionsQuery, RescheduleSessionDto, SessionDetailDto,
    SessionResponseDto,
};
use crate::features::sessions::models::SessionSchedule;
use crate::features::sessions::services::SessionService;
use crate::shared::types::{ApiResponse, Meta};

/// Schedule a session for a club (club admin only)
#[utoipa::path(
    post,
    path = "/api/clubs/{id}/sessions",
    params(
        ("id" = Uuid, Path, description = "Club ID")
    ),
    request_body = CreateSessionDto,
    responses(
        (status = 201, description = "Session created", body = ApiResponse<SessionResponseDto>),
        (status = 400, description = "Invalid session data"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Club admin access required"),
        (status = 404, description = "Club not found")
    ),
    tag = "sessions",
    security(("bearer_auth" = []))
)]
pub async fn create_session(
    user: AuthenticatedUser,
    State(service): State<Arc<SessionService>>,
    Path(club_id): Path<Uuid>,
    AppJson(dto): AppJson<CreateSessionDto>,
) -> Result<(StatusCode, Json<ApiResponse<SessionResponseDto>>)> {
    dto.validate()?;

    let new = dto.into_new_session(club_id, &user.user_id)?;
    let session = service.create_session(&user, new, Utc::now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(session.into()), None, None)),
    ))
}

/// List a club's sessions
///
/// Only sessions that have not yet ended are returned unless `includePast` is set.
#[utoipa::path(
    get,
    path = "/api/clubs/{id}/sessions",
    params(
        ("id" = Uuid, Path, description = "Club ID"),
        ListSessionsQuery
    ),
    responses(
        (status = 200, description = "Sessions ordered by start time", body = ApiResponse<Vec<SessionResponseDto>>),
        (status = 404, description = "Club not found")
    ),
    tag = "sessions"
)]
pub async fn list_club_sessions(
    State(service): State<Arc<SessionService>>,
    Path(club_id): Path<Uuid>,
    AppQuery(query): AppQuery<ListSessionsQuery>,
) -> Result<Json<ApiResponse<Vec<SessionResponseDto>>>> {
    let sessions = service
        .list_club_sessions(club_id, query.include_past, Utc::now())
        .await?;

    let dtos: Vec<SessionResponseDto> = sessions.into_iter().map(Into::into).collect();
    let meta = Meta::total(dtos.len());

    Ok(Json(ApiResponse::success(Some(dtos), None, Some(meta))))
}

/// Get a session with its RSVP tallies
#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session detail", body = ApiResponse<SessionDetailDto>),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn get_session(
    State(service): State<Arc<SessionService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionDetailDto>>> {
    let detail = service.get_session(id).await?;
    Ok(Json(ApiResponse::success(Some(detail.into()), None, None)))
}

/// Move a session to a new time (club admin only)
#[utoipa::path(
    patch,
    path = "/api/sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    request_body = RescheduleSessionDto,
    responses(
        (status = 200, description = "Session rescheduled", body = ApiResponse<SessionResponseDto>),
        (status = 400, description = "Invalid schedule"),
        (status = 403, description = "Club admin access required"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Session cancelled or already started")
    ),
    tag = "sessions",
    security(("bearer_auth" = []))
)]
pub async fn reschedule_session(
    user: AuthenticatedUser,
    State(service): State<Arc<SessionService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<RescheduleSessionDto>,
) -> Result<Json<ApiResponse<SessionResponseDto>>> {
    let schedule = SessionSchedule::new(dto.start_time, dto.end_time)?;
    let session = service.reschedule(id, &user, schedule, Utc::now()).await?;

    Ok(Json(ApiResponse::success(Some(session.into()), None, None)))
}

/// Cancel a session (club admin only)
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session cancelled", body = ApiResponse<SessionResponseDto>),
        (status = 403, description = "Club admin access required"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Already cancelled or has check-ins")
    ),
    tag = "sessions",
    security(("bearer_auth" = []))
)]
pub async fn cancel_session(
    user: AuthenticatedUser,
    State(service): State<Arc<SessionService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionResponseDto>>> {
    let session = service.cancel(id, &user, Utc::now()).await?;

    Ok(Json(ApiResponse::success(
        Some(session.into()),
        Some("Session cancelled".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use chrono::Duration;
    use serde_json::{json, Value};

    use super::*;
    use crate::shared::test_helpers::{member, session_app, session_service};

    #[tokio::test]
    async fn test_create_then_get_session() {
        let (service, club_id) = session_service("coach").await;
        let server = TestServer::new(session_app(service, Some(member("coach")))).unwrap();
        let start = Utc::now() + Duration::days(2);

        let response = server
            .post(&format!("/api/clubs/{}/sessions", club_id))
            .json(&json!({
                "title": "Sunday training",
                "venueLatitude": -33.87,
                "venueLongitude": 151.21,
                "startTime": start,
                "endTime": start + Duration::hours(2),
                "maxAttendees": 12
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let response = server.get(&format!("/api/sessions/{}", id)).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["title"], "Sunday training");
        assert_eq!(body["data"]["rsvpCounts"]["yes"], 0);
        assert_eq!(body["data"]["spotsLeft"], 12);
    }

    #[tokio::test]
    async fn test_create_session_rejects_end_before_start() {
        let (service, club_id) = session_service("coach").await;
        let server = TestServer::new(session_app(service, Some(member("coach")))).unwrap();
        let start = Utc::now() + Duration::days(2);

        let response = server
            .post(&format!("/api/clubs/{}/sessions", club_id))
            .json(&json!({
                "title": "Backwards",
                "startTime": start,
                "endTime": start - Duration::hours(1)
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_session_requires_club_admin() {
        let (service, club_id) = session_service("coach").await;
        let server = TestServer::new(session_app(service, Some(member("player")))).unwrap();
        let start = Utc::now() + Duration::days(2);

        let response = server
            .post(&format!("/api/clubs/{}/sessions", club_id))
            .json(&json!({
                "title": "Not mine",
                "startTime": start,
                "endTime": start + Duration::hours(1)
            }))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_get_unknown_session() {
        let (service, _) = session_service("coach").await;
        let server = TestServer::new(session_app(service, None)).unwrap();

        let response = server.get(&format!("/api/sessions/{}", Uuid::new_v4())).await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["errors"][0], "SESSION_NOT_FOUND");
    }
}
