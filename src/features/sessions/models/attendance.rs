use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// How a user proved they were at the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "check_in_method", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckInMethod {
    Qr,
    Gps,
    Manual,
}

/// Database model for a check-in; immutable once written
#[derive(Debug, Clone, FromRow)]
pub struct Attendance {
    pub id: Uuid,
    pub session_id: Uuid,
    pub user_id: String,
    pub method: CheckInMethod,
    pub checked_in_at: DateTime<Utc>,
}
