use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::features::sessions::models::{NewSession, Session, SessionSchedule};
use crate::features::sessions::services::SessionDetail;
use crate::shared::geo::Coordinate;

/// Request DTO for scheduling a session
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionDto {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 200, message = "venueName must be at most 200 characters"))]
    pub venue_name: Option<String>,

    /// Venue latitude; must be given together with `venueLongitude`
    pub venue_latitude: Option<f64>,
    pub venue_longitude: Option<f64>,

    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,

    #[validate(range(min = 1, message = "maxAttendees must be at least 1"))]
    pub max_attendees: Option<i32>,
}

impl CreateSessionDto {
    pub fn into_new_session(self, club_id: Uuid, created_by: &str) -> Result<NewSession> {
        Ok(NewSession {
            club_id,
            title: self.title,
            description: self.description,
            venue_name: self.venue_name,
            venue: Coordinate::from_parts(self.venue_latitude, self.venue_longitude)?,
            schedule: SessionSchedule::new(self.start_time, self.end_time)?,
            max_attendees: self.max_attendees,
            created_by: created_by.to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleSessionDto {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListSessionsQuery {
    /// Include sessions that have already ended (default: false)
    #[serde(default)]
    pub include_past: bool,
}

/// Response DTO for session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponseDto {
    pub id: Uuid,
    pub club_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_longitude: Option<f64>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attendees: Option<i32>,
    pub is_cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Session> for SessionResponseDto {
    fn from(s: Session) -> Self {
        Self {
            id: s.id,
            club_id: s.club_id,
            title: s.title,
            description: s.description,
            venue_name: s.venue_name,
            venue_latitude: s.venue_latitude,
            venue_longitude: s.venue_longitude,
            start_time: s.start_time,
            end_time: s.end_time,
            max_attendees: s.max_attendees,
            is_cancelled: s.is_cancelled,
            cancelled_at: s.cancelled_at,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RsvpCountsDto {
    pub yes: i64,
    pub no: i64,
    pub maybe: i64,
}

/// Session with RSVP tallies
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetailDto {
    #[serde(flatten)]
    pub session: SessionResponseDto,
    pub rsvp_counts: RsvpCountsDto,
    /// Open YES seats; absent when the session has no capacity limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spots_left: Option<i64>,
}

impl From<SessionDetail> for SessionDetailDto {
    fn from(detail: SessionDetail) -> Self {
        let spots_left = detail.spots_left();
        Self {
            rsvp_counts: RsvpCountsDto {
                yes: detail.counts.yes,
                no: detail.counts.no,
                maybe: detail.counts.maybe,
            },
            spots_left,
            session: detail.session.into(),
        }
    }
}
