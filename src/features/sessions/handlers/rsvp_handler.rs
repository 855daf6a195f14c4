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
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::sessions::dtos::{
    AttendanceResponseDto, CheckInDto, RsvpResponseDto, SetRsvpDto,
};
use crate::features::sessions::services::SessionService;
use crate::shared::geo::Coordinate;
use crate::shared::types::{ApiResponse, Meta};

/// Create or replace the caller's RSVP
///
/// Moving into `YES` is rejected with `SESSION_AT_CAPACITY` when every seat
/// is taken. A caller already holding `YES` can always update the note.
#[utoipa::path(
    put,
    path = "/api/sessions/{id}/rsvp",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    request_body = SetRsvpDto,
    responses(
        (status = 200, description = "RSVP saved", body = ApiResponse<RsvpResponseDto>),
        (status = 400, description = "Invalid status or note"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Session cancelled, already started or at capacity")
    ),
    tag = "rsvps",
    security(("bearer_auth" = []))
)]
pub async fn set_rsvp(
    user: AuthenticatedUser,
    State(service): State<Arc<SessionService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<SetRsvpDto>,
) -> Result<Json<ApiResponse<RsvpResponseDto>>> {
    dto.validate()?;

    let rsvp = service
        .set_rsvp(id, &user.user_id, dto.status, dto.note, Utc::now())
        .await?;

    Ok(Json(ApiResponse::success(Some(rsvp.into()), None, None)))
}

/// Withdraw the caller's RSVP
#[utoipa::path(
    delete,
    path = "/api/sessions/{id}/rsvp",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "RSVP withdrawn"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Session or RSVP not found")
    ),
    tag = "rsvps",
    security(("bearer_auth" = []))
)]
pub async fn withdraw_rsvp(
    user: AuthenticatedUser,
    State(service): State<Arc<SessionService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.withdraw_rsvp(id, &user.user_id).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("RSVP withdrawn".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}/rsvp",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "The caller's RSVP", body = ApiResponse<RsvpResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Session or RSVP not found")
    ),
    tag = "rsvps",
    security(("bearer_auth" = []))
)]
pub async fn get_my_rsvp(
    user: AuthenticatedUser,
    State(service): State<Arc<SessionService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RsvpResponseDto>>> {
    let rsvp = service.get_my_rsvp(id, &user.user_id).await?;
    Ok(Json(ApiResponse::success(Some(rsvp.into()), None, None)))
}

/// List every RSVP for a session
#[utoipa::path(
    get,
    path = "/api/sessions/{id}/rsvps",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "RSVPs in submission order", body = ApiResponse<Vec<RsvpResponseDto>>),
        (status = 404, description = "Session not found")
    ),
    tag = "rsvps"
)]
pub async fn list_rsvps(
    State(service): State<Arc<SessionService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<RsvpResponseDto>>>> {
    let rsvps = service.list_rsvps(id).await?;

    let dtos: Vec<RsvpResponseDto> = rsvps.into_iter().map(Into::into).collect();
    let meta = Meta::total(dtos.len());

    Ok(Json(ApiResponse::success(Some(dtos), None, Some(meta))))
}

/// Check in to a session
///
/// Allowed from 30 minutes before the start until 30 minutes after the end.
/// GPS check-ins must be within 0.5 km of the venue when both positions are known.
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/check-in",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    request_body = CheckInDto,
    responses(
        (status = 201, description = "Checked in", body = ApiResponse<AttendanceResponseDto>),
        (status = 400, description = "Invalid method or coordinate"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Cancelled, outside the window, already checked in or too far")
    ),
    tag = "rsvps",
    security(("bearer_auth" = []))
)]
pub async fn check_in(
    user: AuthenticatedUser,
    State(service): State<Arc<SessionService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CheckInDto>,
) -> Result<(StatusCode, Json<ApiResponse<AttendanceResponseDto>>)> {
    let position = Coordinate::from_parts(dto.latitude, dto.longitude)?;

    let attendance = service
        .check_in(id, &user.user_id, dto.method, position, Utc::now())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(attendance.into()), None, None)),
    ))
}

/// List check-ins for a session (club admin only)
#[utoipa::path(
    get,
    path = "/api/sessions/{id}/attendance",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Check-ins in arrival order", body = ApiResponse<Vec<AttendanceResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Club admin access required"),
        (status = 404, description = "Session not found")
    ),
    tag = "rsvps",
    security(("bearer_auth" = []))
)]
pub async fn list_attendance(
    user: AuthenticatedUser,
    State(service): State<Arc<SessionService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<AttendanceResponseDto>>>> {
    let attendance = service.list_attendance(id, &user).await?;

    let dtos: Vec<AttendanceResponseDto> = attendance.into_iter().map(Into::into).collect();
    let meta = Meta::total(dtos.len());

    Ok(Json(ApiResponse::success(Some(dtos), None, Some(meta))))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use chrono::Duration;
    use serde_json::{json, Value};

    use super::*;
    use crate::features::sessions::models::{NewSession, SessionSchedule};
    use crate::features::sessions::services::SessionStore;
    use crate::shared::test_helpers::{member, session_app, session_fixture};

    /// Session starting `starts_in` from now, seeded straight into the store
    async fn seeded_session(
        store: &dyn SessionStore,
        club_id: Uuid,
        starts_in: Duration,
        max_attendees: Option<i32>,
    ) -> Uuid {
        let start = Utc::now() + starts_in;
        let new = NewSession {
            club_id,
            title: "Thursday league".to_string(),
            description: None,
            venue_name: None,
            venue: None,
            schedule: SessionSchedule::new(start, start + Duration::hours(2)).unwrap(),
            max_attendees,
            created_by: "coach".to_string(),
        };
        store.create_session(&new).await.unwrap().id
    }

    #[tokio::test]
    async fn test_rsvp_capacity_over_http() {
        let (service, store, club_id) = session_fixture("coach").await;
        let session_id = seeded_session(store.as_ref(), club_id, Duration::days(1), Some(1)).await;

        let ana = TestServer::new(session_app(service.clone(), Some(member("ana")))).unwrap();
        let ben = TestServer::new(session_app(service, Some(member("ben")))).unwrap();
        let path = format!("/api/sessions/{}/rsvp", session_id);

        let response = ana.put(&path).json(&json!({ "status": "YES" })).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "YES");

        let response = ben.put(&path).json(&json!({ "status": "YES" })).await;
        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["errors"][0], "SESSION_AT_CAPACITY");

        let response = ana
            .put(&path)
            .json(&json!({ "status": "YES", "note": "bringing fins" }))
            .await;
        response.assert_status_ok();

        let response = ana.get(&format!("/api/sessions/{}/rsvps", session_id)).await;
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["note"], "bringing fins");
    }

    #[tokio::test]
    async fn test_rsvp_rejects_unknown_status_and_long_note() {
        let (service, store, club_id) = session_fixture("coach").await;
        let session_id = seeded_session(store.as_ref(), club_id, Duration::days(1), None).await;
        let server = TestServer::new(session_app(service, Some(member("ana")))).unwrap();
        let path = format!("/api/sessions/{}/rsvp", session_id);

        let response = server.put(&path).json(&json!({ "status": "PERHAPS" })).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .put(&path)
            .json(&json!({ "status": "MAYBE", "note": "x".repeat(501) }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_withdraw_without_rsvp_is_not_found() {
        let (service, store, club_id) = session_fixture("coach").await;
        let session_id = seeded_session(store.as_ref(), club_id, Duration::days(1), None).await;
        let server = TestServer::new(session_app(service, Some(member("ana")))).unwrap();

        let response = server
            .delete(&format!("/api/sessions/{}/rsvp", session_id))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["errors"][0], "RSVP_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_rsvp_requires_authentication() {
        let (service, store, club_id) = session_fixture("coach").await;
        let session_id = seeded_session(store.as_ref(), club_id, Duration::days(1), None).await;
        let server = TestServer::new(session_app(service, None)).unwrap();

        let response = server
            .put(&format!("/api/sessions/{}/rsvp", session_id))
            .json(&json!({ "status": "YES" }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_check_in_over_http() {
        let (service, store, club_id) = session_fixture("coach").await;
        let session_id =
            seeded_session(store.as_ref(), club_id, Duration::minutes(10), None).await;
        let server = TestServer::new(session_app(service.clone(), Some(member("ana")))).unwrap();
        let path = format!("/api/sessions/{}/check-in", session_id);

        let response = server.post(&path).json(&json!({ "method": "QR" })).await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["method"], "QR");

        let response = server.post(&path).json(&json!({ "method": "QR" })).await;
        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["errors"][0], "ALREADY_CHECKED_IN");

        let admin = TestServer::new(session_app(service, Some(member("coach")))).unwrap();
        let response = admin
            .get(&format!("/api/sessions/{}/attendance", session_id))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"][0]["userId"], "ana");
    }

    #[tokio::test]
    async fn test_check_in_too_early_and_half_coordinate() {
        let (service, store, club_id) = session_fixture("coach").await;
        let session_id = seeded_session(store.as_ref(), club_id, Duration::hours(3), None).await;
        let server = TestServer::new(session_app(service, Some(member("ana")))).unwrap();
        let path = format!("/api/sessions/{}/check-in", session_id);

        let response = server.post(&path).json(&json!({ "method": "MANUAL" })).await;
        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["errors"][0], "CHECK_IN_NOT_OPEN");

        let response = server
            .post(&path)
            .json(&json!({ "method": "GPS", "latitude": 10.0 }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
