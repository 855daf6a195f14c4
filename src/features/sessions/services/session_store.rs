use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{handle_db_error, AppError, RejectionReason, Result};
use crate::features::sessions::models::{
    Attendance, CheckInMethod, NewSession, Rsvp, RsvpCounts, RsvpStatus, Session,
    SessionSchedule,
};

/// An RSVP upsert for one (session, user) pair
#[derive(Debug, Clone)]
pub struct RsvpWrite {
    pub session_id: Uuid,
    pub user_id: String,
    pub status: RsvpStatus,
    pub note: Option<String>,
    /// Clock for the not-started check against the locked session row
    pub now: DateTime<Utc>,
}

/// Data access for sessions, RSVPs and attendance.
///
/// Implementations own the race-safety guarantees: one RSVP and one
/// attendance row per (session, user), the capacity limit under concurrent
/// writers, and no attendance on a cancelled session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, new: &NewSession) -> Result<Session>;

    async fn find_session(&self, id: Uuid) -> Result<Option<Session>>;

    /// Sessions of a club ordered by start time, optionally only those ending after `ending_after`
    async fn list_club_sessions(
        &self,
        club_id: Uuid,
        ending_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Session>>;

    /// Move a session that is not cancelled; `None` when no such session
    async fn reschedule_session(
        &self,
        id: Uuid,
        schedule: SessionSchedule,
    ) -> Result<Option<Session>>;

    /// Cancel a session nobody has checked in to
    async fn cancel_session(&self, id: Uuid, at: DateTime<Utc>) -> Result<Session>;

    async fn find_rsvp(&self, session_id: Uuid, user_id: &str) -> Result<Option<Rsvp>>;

    async fn list_rsvps(&self, session_id: Uuid) -> Result<Vec<Rsvp>>;

    async fn count_rsvps(&self, session_id: Uuid) -> Result<RsvpCounts>;

    /// Insert or overwrite the pair's RSVP.
    ///
    /// The session must exist, be neither cancelled nor started at `write.now`,
    /// and a YES must fit under `max_attendees` counting everyone but the caller.
    /// These checks and the write are atomic with respect to other writers.
    async fn upsert_rsvp(&self, write: &RsvpWrite) -> Result<Rsvp>;

    /// Remove the pair's RSVP; false when there was none
    async fn delete_rsvp(&self, session_id: Uuid, user_id: &str) -> Result<bool>;

    async fn find_attendance(&self, session_id: Uuid, user_id: &str)
        -> Result<Option<Attendance>>;

    async fn list_attendance(&self, session_id: Uuid) -> Result<Vec<Attendance>>;

    /// Insert-if-absent check-in
    async fn insert_attendance(
        &self,
        session_id: Uuid,
        user_id: &str,
        method: CheckInMethod,
        at: DateTime<Utc>,
    ) -> Result<Attendance>;
}

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SESSION_COLUMNS: &str = r#"
    id, club_id, title, description, venue_name, venue_latitude, venue_longitude,
    start_time, end_time, max_attendees, is_cancelled, cancelled_at,
    created_by, created_at, updated_at
"#;

const RSVP_COLUMNS: &str = "id, session_id, user_id, status, note, created_at, updated_at";

const ATTENDANCE_COLUMNS: &str = "id, session_id, user_id, method, checked_in_at";

fn db_err(e: sqlx::Error) -> AppError {
    handle_db_error(e, None)
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create_session(&self, new: &NewSession) -> Result<Session> {
        let sql = format!(
            r#"
            INSERT INTO sessions (
                club_id, title, description, venue_name, venue_latitude, venue_longitude,
                start_time, end_time, max_attendees, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {SESSION_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Session>(&sql)
            .bind(new.club_id)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.venue_name)
            .bind(new.venue.map(|c| c.lat()))
            .bind(new.venue.map(|c| c.lng()))
            .bind(new.schedule.start_time())
            .bind(new.schedule.end_time())
            .bind(new.max_attendees)
            .bind(&new.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn find_session(&self, id: Uuid) -> Result<Option<Session>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1");

        sqlx::query_as::<_, Session>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn list_club_sessions(
        &self,
        club_id: Uuid,
        ending_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Session>> {
        let sql = format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM sessions
            WHERE club_id = $1
            AND ($2::TIMESTAMPTZ IS NULL OR end_time > $2)
            ORDER BY start_time ASC
            "#
        );

        sqlx::query_as::<_, Session>(&sql)
            .bind(club_id)
            .bind(ending_after)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn reschedule_session(
        &self,
        id: Uuid,
        schedule: SessionSchedule,
    ) -> Result<Option<Session>> {
        let sql = format!(
            r#"
            UPDATE sessions
            SET start_time = $2, end_time = $3, updated_at = NOW()
            WHERE id = $1 AND is_cancelled = FALSE
            RETURNING {SESSION_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Session>(&sql)
            .bind(id)
            .bind(schedule.start_time())
            .bind(schedule.end_time())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn cancel_session(&self, id: Uuid, at: DateTime<Utc>) -> Result<Session> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Row lock waits for in-flight check-ins holding FOR SHARE on the session
        let cancelled: Option<bool> =
            sqlx::query_scalar("SELECT is_cancelled FROM sessions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;

        match cancelled {
            None => return Err(RejectionReason::SessionNotFound.into()),
            Some(true) => return Err(RejectionReason::SessionCancelled.into()),
            Some(false) => {}
        }

        let has_attendance: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM attendances WHERE session_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        if has_attendance {
            return Err(RejectionReason::SessionHasAttendance.into());
        }

        let sql = format!(
            r#"
            UPDATE sessions
            SET is_cancelled = TRUE, cancelled_at = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {SESSION_COLUMNS}
            "#
        );

        let session = sqlx::query_as::<_, Session>(&sql)
            .bind(id)
            .bind(at)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        Ok(session)
    }

    async fn find_rsvp(&self, session_id: Uuid, user_id: &str) -> Result<Option<Rsvp>> {
        let sql = format!("SELECT {RSVP_COLUMNS} FROM rsvps WHERE session_id = $1 AND user_id = $2");

        sqlx::query_as::<_, Rsvp>(&sql)
            .bind(session_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn list_rsvps(&self, session_id: Uuid) -> Result<Vec<Rsvp>> {
        let sql = format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps WHERE session_id = $1 ORDER BY created_at ASC"
        );

        sqlx::query_as::<_, Rsvp>(&sql)
            .bind(session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn count_rsvps(&self, session_id: Uuid) -> Result<RsvpCounts> {
        sqlx::query_as::<_, RsvpCounts>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'yes') AS yes,
                COUNT(*) FILTER (WHERE status = 'no') AS no,
                COUNT(*) FILTER (WHERE status = 'maybe') AS maybe
            FROM rsvps
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn upsert_rsvp(&self, write: &RsvpWrite) -> Result<Rsvp> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Serializes RSVP writers and cancellation per session
        let locked: Option<(bool, DateTime<Utc>, Option<i32>)> = sqlx::query_as(
            "SELECT is_cancelled, start_time, max_attendees FROM sessions WHERE id = $1 FOR UPDATE",
        )
        .bind(write.session_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let (is_cancelled, start_time, max_attendees) =
            locked.ok_or(RejectionReason::SessionNotFound)?;

        if is_cancelled {
            return Err(RejectionReason::SessionCancelled.into());
        }
        if start_time <= write.now {
            return Err(RejectionReason::SessionAlreadyStarted.into());
        }

        if let (Some(max), RsvpStatus::Yes) = (max_attendees, write.status) {
            let taken: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*)
                FROM rsvps
                WHERE session_id = $1 AND status = 'yes' AND user_id <> $2
                "#,
            )
            .bind(write.session_id)
            .bind(&write.user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;

            if taken >= i64::from(max) {
                return Err(RejectionReason::SessionAtCapacity.into());
            }
        }

        let sql = format!(
            r#"
            INSERT INTO rsvps (session_id, user_id, status, note)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (session_id, user_id)
            DO UPDATE SET status = EXCLUDED.status, note = EXCLUDED.note, updated_at = NOW()
            RETURNING {RSVP_COLUMNS}
            "#
        );

        let rsvp = sqlx::query_as::<_, Rsvp>(&sql)
            .bind(write.session_id)
            .bind(&write.user_id)
            .bind(write.status)
            .bind(&write.note)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        Ok(rsvp)
    }

    async fn delete_rsvp(&self, session_id: Uuid, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM rsvps WHERE session_id = $1 AND user_id = $2")
            .bind(session_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_attendance(
        &self,
        session_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Attendance>> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendances WHERE session_id = $1 AND user_id = $2"
        );

        sqlx::query_as::<_, Attendance>(&sql)
            .bind(session_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn list_attendance(&self, session_id: Uuid) -> Result<Vec<Attendance>> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendances WHERE session_id = $1 ORDER BY checked_in_at ASC"
        );

        sqlx::query_as::<_, Attendance>(&sql)
            .bind(session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn insert_attendance(
        &self,
        session_id: Uuid,
        user_id: &str,
        method: CheckInMethod,
        at: DateTime<Utc>,
    ) -> Result<Attendance> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Shared lock blocks a concurrent cancellation until this check-in commits
        let cancelled: Option<bool> =
            sqlx::query_scalar("SELECT is_cancelled FROM sessions WHERE id = $1 FOR SHARE")
                .bind(session_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;

        match cancelled {
            None => return Err(RejectionReason::SessionNotFound.into()),
            Some(true) => return Err(RejectionReason::SessionCancelled.into()),
            Some(false) => {}
        }

        let sql = format!(
            r#"
            INSERT INTO attendances (session_id, user_id, method, checked_in_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        );

        let attendance = sqlx::query_as::<_, Attendance>(&sql)
            .bind(session_id)
            .bind(user_id)
            .bind(method)
            .bind(at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| handle_db_error(e, Some(RejectionReason::AlreadyCheckedIn)))?;

        tx.commit().await.map_err(db_err)?;

        Ok(attendance)
    }
}
