use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{handle_db_error, Result};
use crate::features::clubs::models::{Club, ClubFilters, ClubRole};
use crate::shared::geo::BoundingBox;

/// Data access for clubs and club membership
#[async_trait]
pub trait ClubStore: Send + Sync {
    /// Active clubs whose coordinate lies inside `bounds` and match `filters`
    async fn find_in_bounds(&self, bounds: &BoundingBox, filters: &ClubFilters)
        -> Result<Vec<Club>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Club>>;

    async fn member_role(&self, club_id: Uuid, user_id: &str) -> Result<Option<ClubRole>>;

    /// Insert or update a membership row
    async fn set_member_role(&self, club_id: Uuid, user_id: &str, role: ClubRole) -> Result<()>;
}

pub struct PgClubStore {
    pool: PgPool,
}

impl PgClubStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CLUB_COLUMNS: &str = r#"
    id, name, description, city, country, latitude, longitude,
    is_active, beginner_friendly, is_verified, created_at, updated_at
"#;

#[async_trait]
impl ClubStore for PgClubStore {
    async fn find_in_bounds(
        &self,
        bounds: &BoundingBox,
        filters: &ClubFilters,
    ) -> Result<Vec<Club>> {
        let sql = format!(
            r#"
            SELECT {CLUB_COLUMNS}
            FROM clubs
            WHERE is_active = TRUE
            AND latitude BETWEEN $1 AND $2
            AND longitude BETWEEN $3 AND $4
            AND ($5::BOOLEAN IS NULL OR beginner_friendly = $5)
            AND ($6::BOOLEAN IS NULL OR is_verified = $6)
            "#
        );

        sqlx::query_as::<_, Club>(&sql)
            .bind(bounds.min_lat)
            .bind(bounds.max_lat)
            .bind(bounds.min_lng)
            .bind(bounds.max_lng)
            .bind(filters.beginner_friendly)
            .bind(filters.verified)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, None))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Club>> {
        let sql = format!("SELECT {CLUB_COLUMNS} FROM clubs WHERE id = $1");

        sqlx::query_as::<_, Club>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, None))
    }

    async fn member_role(&self, club_id: Uuid, user_id: &str) -> Result<Option<ClubRole>> {
        sqlx::query_scalar::<_, ClubRole>(
            "SELECT role FROM club_members WHERE club_id = $1 AND user_id = $2",
        )
        .bind(club_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, None))
    }

    async fn set_member_role(&self, club_id: Uuid, user_id: &str, role: ClubRole) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO club_members (club_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (club_id, user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(club_id)
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, None))?;

        Ok(())
    }
}
