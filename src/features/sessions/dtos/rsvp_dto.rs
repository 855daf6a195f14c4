use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::sessions::models::{Attendance, CheckInMethod, Rsvp, RsvpStatus};
use crate::shared::constants::MAX_RSVP_NOTE_LENGTH;

/// Request DTO for creating or replacing the caller's RSVP
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetRsvpDto {
    pub status: RsvpStatus,

    #[validate(length(max = MAX_RSVP_NOTE_LENGTH, message = "note must be at most 500 characters"))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RsvpResponseDto {
    pub id: Uuid,
    pub session_id: Uuid,
    pub user_id: String,
    pub status: RsvpStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Rsvp> for RsvpResponseDto {
    fn from(r: Rsvp) -> Self {
        Self {
            id: r.id,
            session_id: r.session_id,
            user_id: r.user_id,
            status: r.status,
            note: r.note,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Request DTO for checking in to a session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInDto {
    pub method: CheckInMethod,

    /// Current latitude; used for GPS check-in together with `longitude`
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResponseDto {
    pub id: Uuid,
    pub session_id: Uuid,
    pub user_id: String,
    pub method: CheckInMethod,
    pub checked_in_at: DateTime<Utc>,
}

impl From<Attendance> for AttendanceResponseDto {
    fn from(a: Attendance) -> Self {
        Self {
            id: a.id,
            session_id: a.session_id,
            user_id: a.user_id,
            method: a.method,
            checked_in_at: a.checked_in_at,
        }
    }
}
