use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::Result;
use crate::shared::geo::Coordinate;

/// Club membership role matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "club_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClubRole {
    Admin,
    Member,
}

/// Database model for club
#[derive(Debug, Clone, FromRow)]
pub struct Club {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub is_active: bool,
    pub beginner_friendly: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Club {
    pub fn coordinate(&self) -> Result<Coordinate> {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Optional equality filters for the nearby search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClubFilters {
    pub beginner_friendly: Option<bool>,
    pub verified: Option<bool>,
}

impl ClubFilters {
    #[cfg(test)]
    pub fn matches(&self, club: &Club) -> bool {
        self.beginner_friendly
            .is_none_or(|wanted| club.beginner_friendly == wanted)
            && self.verified.is_none_or(|wanted| club.is_verified == wanted)
    }
}
