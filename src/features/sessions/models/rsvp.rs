use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// RSVP status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "rsvp_status", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum RsvpStatus {
    Yes,
    No,
    Maybe,
}

impl std::fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RsvpStatus::Yes => write!(f, "YES"),
            RsvpStatus::No => write!(f, "NO"),
            RsvpStatus::Maybe => write!(f, "MAYBE"),
        }
    }
}

/// Database model for a user's RSVP to a session
#[derive(Debug, Clone, FromRow)]
pub struct Rsvp {
    pub id: Uuid,
    pub session_id: Uuid,
    pub user_id: String,
    pub status: RsvpStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-status RSVP tallies for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct RsvpCounts {
    pub yes: i64,
    pub no: i64,
    pub maybe: i64,
}
