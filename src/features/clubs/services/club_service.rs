use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, RejectionReason, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::clubs::dtos::NearbyClubsQuery;
use crate::features::clubs::models::{Club, ClubFilters, ClubRole};
use crate::features::clubs::services::ClubStore;
use crate::shared::constants::{
    DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_RADIUS_KM, MAX_SEARCH_LIMIT, MAX_SEARCH_RADIUS_KM,
};
use crate::shared::geo::{self, BoundingBox, Coordinate, WithinRadius};

/// A validated nearby-club search
#[derive(Debug, Clone)]
pub struct NearbySearch {
    pub center: Coordinate,
    pub radius_km: f64,
    pub limit: usize,
    pub filters: ClubFilters,
}

impl NearbySearch {
    pub fn new(
        center: Coordinate,
        radius_km: f64,
        limit: u32,
        filters: ClubFilters,
    ) -> Result<Self> {
        if !radius_km.is_finite() || radius_km <= 0.0 || radius_km > MAX_SEARCH_RADIUS_KM {
            return Err(AppError::Validation(format!(
                "Radius must be greater than 0 and at most {} km",
                MAX_SEARCH_RADIUS_KM
            )));
        }
        if limit == 0 || limit > MAX_SEARCH_LIMIT {
            return Err(AppError::Validation(format!(
                "Limit must be between 1 and {}",
                MAX_SEARCH_LIMIT
            )));
        }

        Ok(Self {
            center,
            radius_km,
            limit: limit as usize,
            filters,
        })
    }
}

impl TryFrom<NearbyClubsQuery> for NearbySearch {
    type Error = AppError;

    fn try_from(query: NearbyClubsQuery) -> Result<Self> {
        Self::new(
            Coordinate::new(query.lat, query.lng)?,
            query.radius_km.unwrap_or(DEFAULT_SEARCH_RADIUS_KM),
            query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
            ClubFilters {
                beginner_friendly: query.beginner_friendly,
                verified: query.verified,
            },
        )
    }
}

/// Club directory lookups, nearby search and club-admin checks
pub struct ClubService {
    store: Arc<dyn ClubStore>,
}

impl ClubService {
    pub fn new(store: Arc<dyn ClubStore>) -> Self {
        Self { store }
    }

    /// Active clubs within the search radius, nearest first
    pub async fn search_nearby(&self, search: &NearbySearch) -> Result<Vec<WithinRadius<Club>>> {
        let bounds = BoundingBox::around(search.center, search.radius_km);
        let candidates = self.store.find_in_bounds(&bounds, &search.filters).await?;
        let candidate_count = candidates.len();

        let positioned = candidates.into_iter().filter_map(|club| match club.coordinate() {
            Ok(position) => Some((club, position)),
            Err(e) => {
                tracing::warn!("Skipping club {} with invalid coordinate: {}", club.id, e);
                None
            }
        });

        let hits = geo::nearest_within(
            search.center,
            search.radius_km,
            search.limit,
            positioned,
            |(_, position)| *position,
        );

        tracing::debug!(
            "Nearby search at ({}, {}) r={}km: {} in box, {} returned",
            search.center.lat(),
            search.center.lng(),
            search.radius_km,
            candidate_count,
            hits.len()
        );

        Ok(hits
            .into_iter()
            .map(|hit| WithinRadius {
                item: hit.item.0,
                distance_km: hit.distance_km,
            })
            .collect())
    }

    /// Get an active club by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Club> {
        self.store
            .find_by_id(id)
            .await?
            .filter(|club| club.is_active)
            .ok_or(AppError::Rejected(RejectionReason::ClubNotFound))
    }

    /// Whether the user may manage the club's sessions
    pub async fn is_club_admin(&self, club_id: Uuid, user: &AuthenticatedUser) -> Result<bool> {
        if user.is_super_admin() {
            return Ok(true);
        }
        let role = self.store.member_role(club_id, &user.user_id).await?;
        Ok(role == Some(ClubRole::Admin))
    }

    pub async fn ensure_club_admin(&self, club_id: Uuid, user: &AuthenticatedUser) -> Result<()> {
        if self.is_club_admin(club_id, user).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden("Club admin access required".to_string()))
        }
    }

    /// Promote a user to admin of an existing club
    pub async fn grant_admin(&self, club_id: Uuid, user_id: &str) -> Result<()> {
        self.get_by_id(club_id).await?;
        self.store
            .set_member_role(club_id, user_id, ClubRole::Admin)
            .await?;

        tracing::info!("Granted club admin: club_id={}, user_id={}", club_id, user_id);

        Ok(())
    }
}
