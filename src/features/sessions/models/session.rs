use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::shared::geo::Coordinate;

/// Database model for a scheduled club session
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub club_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub venue_name: Option<String>,
    pub venue_latitude: Option<f64>,
    pub venue_longitude: Option<f64>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_attendees: Option<i32>,
    pub is_cancelled: bool,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Venue position, if one was recorded and is in range
    pub fn venue_coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.venue_latitude, self.venue_longitude)
            .ok()
            .flatten()
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now
    }
}

/// Start and end of a session; end is always strictly after start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSchedule {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl SessionSchedule {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Result<Self> {
        if end_time <= start_time {
            return Err(AppError::Validation(
                "endTime must be after startTime".to_string(),
            ));
        }
        Ok(Self {
            start_time,
            end_time,
        })
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }
}

/// Data for creating a new session
#[derive(Debug, Clone)]
pub struct NewSession {
    pub club_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub venue_name: Option<String>,
    pub venue: Option<Coordinate>,
    pub schedule: SessionSchedule,
    pub max_attendees: Option<i32>,
    pub created_by: String,
}
