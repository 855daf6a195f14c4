use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::clubs::models::Club;
use crate::shared::constants::{MAX_SEARCH_LIMIT, MAX_SEARCH_RADIUS_KM};
use crate::shared::geo::WithinRadius;

/// Query parameters for the nearby-club search
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NearbyClubsQuery {
    /// Latitude of the search center in decimal degrees
    #[validate(range(min = -90.0, max = 90.0, message = "lat must be between -90 and 90"))]
    #[param(minimum = -90, maximum = 90)]
    pub lat: f64,

    /// Longitude of the search center in decimal degrees
    #[validate(range(min = -180.0, max = 180.0, message = "lng must be between -180 and 180"))]
    #[param(minimum = -180, maximum = 180)]
    pub lng: f64,

    /// Search radius in kilometers (default: 25, max: 500)
    #[validate(range(
        exclusive_min = 0.0,
        max = MAX_SEARCH_RADIUS_KM,
        message = "radiusKm must be greater than 0 and at most 500"
    ))]
    pub radius_km: Option<f64>,

    /// Maximum number of results (default: 20, max: 100)
    #[validate(range(min = 1, max = MAX_SEARCH_LIMIT, message = "limit must be between 1 and 100"))]
    pub limit: Option<u32>,

    /// Only clubs that do (or do not) welcome beginners
    pub beginner_friendly: Option<bool>,

    /// Only verified (or unverified) clubs
    pub verified: Option<bool>,
}

/// Response DTO for club
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubResponseDto {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub beginner_friendly: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Club> for ClubResponseDto {
    fn from(c: Club) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            city: c.city,
            country: c.country,
            latitude: c.latitude,
            longitude: c.longitude,
            beginner_friendly: c.beginner_friendly,
            is_verified: c.is_verified,
            created_at: c.created_at,
        }
    }
}

/// Club annotated with its distance from the search center
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearbyClubDto {
    #[serde(flatten)]
    pub club: ClubResponseDto,
    /// Great-circle distance in kilometers, rounded to one decimal
    pub distance_km: f64,
}

impl From<WithinRadius<Club>> for NearbyClubDto {
    fn from(hit: WithinRadius<Club>) -> Self {
        Self {
            club: hit.item.into(),
            distance_km: hit.distance_km,
        }
    }
}

/// Request DTO for promoting a user to club admin
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantClubAdminDto {
    #[validate(length(min = 1, max = 255, message = "userId must be 1-255 characters"))]
    pub user_id: String,
}
