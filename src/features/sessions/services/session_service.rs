use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::config::CheckInConfig;
use crate::core::error::{AppError, RejectionReason, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::clubs::services::ClubService;
use crate::features::sessions::models::{
    Attendance, CheckInMethod, NewSession, Rsvp, RsvpCounts, RsvpStatus, Session,
    SessionSchedule,
};
use crate::features::sessions::services::{RsvpWrite, SessionStore};
use crate::shared::geo::{self, Coordinate};

/// A session together with its RSVP tallies
#[derive(Debug, Clone)]
pub struct SessionDetail {
    pub session: Session,
    pub counts: RsvpCounts,
}

impl SessionDetail {
    /// Seats still open for YES, `None` when the session is uncapped
    pub fn spots_left(&self) -> Option<i64> {
        self.session
            .max_attendees
            .map(|max| (i64::from(max) - self.counts.yes).max(0))
    }
}

pub struct SessionService {
    store: Arc<dyn SessionStore>,
    clubs: Arc<ClubService>,
    check_in: CheckInConfig,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>, clubs: Arc<ClubService>, check_in: CheckInConfig) -> Self {
        Self {
            store,
            clubs,
            check_in,
        }
    }

    async fn load_session(&self, id: Uuid) -> Result<Session> {
        self.store
            .find_session(id)
            .await?
            .ok_or(AppError::Rejected(RejectionReason::SessionNotFound))
    }

    /// Schedule a new session for a club the user administers
    pub async fn create_session(
        &self,
        user: &AuthenticatedUser,
        new: NewSession,
        now: DateTime<Utc>,
    ) -> Result<Session> {
        self.clubs.get_by_id(new.club_id).await?;
        self.clubs.ensure_club_admin(new.club_id, user).await?;

        if new.schedule.start_time() <= now {
            return Err(AppError::Validation(
                "startTime must be in the future".to_string(),
            ));
        }

        let session = self.store.create_session(&new).await?;

        tracing::info!(
            "Session created: id={}, club_id={}, by={}",
            session.id,
            session.club_id,
            user.user_id
        );

        Ok(session)
    }

    /// Sessions of an active club, upcoming ones only unless `include_past`
    pub async fn list_club_sessions(
        &self,
        club_id: Uuid,
        include_past: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Session>> {
        self.clubs.get_by_id(club_id).await?;

        let ending_after = if include_past { None } else { Some(now) };
        self.store.list_club_sessions(club_id, ending_after).await
    }

    pub async fn get_session(&self, id: Uuid) -> Result<SessionDetail> {
        let session = self.load_session(id).await?;
        let counts = self.store.count_rsvps(id).await?;

        Ok(SessionDetail { session, counts })
    }

    /// Move a session that has neither started nor been cancelled
    pub async fn reschedule(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
        schedule: SessionSchedule,
        now: DateTime<Utc>,
    ) -> Result<Session> {
        let session = self.load_session(id).await?;
        self.clubs.ensure_club_admin(session.club_id, user).await?;

        if session.is_cancelled {
            return Err(RejectionReason::SessionCancelled.into());
        }
        if session.has_started(now) {
            return Err(RejectionReason::SessionAlreadyStarted.into());
        }
        if schedule.start_time() <= now {
            return Err(AppError::Validation(
                "startTime must be in the future".to_string(),
            ));
        }

        // Cancelled between the read and the write
        let updated = self
            .store
            .reschedule_session(id, schedule)
            .await?
            .ok_or(AppError::Rejected(RejectionReason::SessionCancelled))?;

        tracing::info!("Session rescheduled: id={}, by={}", id, user.user_id);

        Ok(updated)
    }

    /// Cancel a session; the row is kept for history
    pub async fn cancel(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
        now: DateTime<Utc>,
    ) -> Result<Session> {
        let session = self.load_session(id).await?;
        self.clubs.ensure_club_admin(session.club_id, user).await?;

        if session.is_cancelled {
            return Err(RejectionReason::SessionCancelled.into());
        }

        let cancelled = self.store.cancel_session(id, now).await?;

        tracing::info!("Session cancelled: id={}, by={}", id, user.user_id);

        Ok(cancelled)
    }

    /// Create or overwrite the user's RSVP.
    ///
    /// Seats are counted without the caller's own RSVP, so a YES holder
    /// re-sending YES always fits.
    pub async fn set_rsvp(
        &self,
        session_id: Uuid,
        user_id: &str,
        status: RsvpStatus,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Rsvp> {
        let session = self.load_session(session_id).await?;

        if session.is_cancelled {
            return Err(RejectionReason::SessionCancelled.into());
        }
        if session.has_started(now) {
            return Err(RejectionReason::SessionAlreadyStarted.into());
        }

        let rsvp = self
            .store
            .upsert_rsvp(&RsvpWrite {
                session_id,
                user_id: user_id.to_string(),
                status,
                note,
                now,
            })
            .await?;

        tracing::debug!(
            "RSVP set: session_id={}, user_id={}, status={}",
            session_id,
            user_id,
            rsvp.status
        );

        Ok(rsvp)
    }

    /// Delete the user's RSVP, even after the session has started
    pub async fn withdraw_rsvp(&self, session_id: Uuid, user_id: &str) -> Result<()> {
        self.load_session(session_id).await?;

        if !self.store.delete_rsvp(session_id, user_id).await? {
            return Err(RejectionReason::RsvpNotFound.into());
        }

        tracing::debug!("RSVP withdrawn: session_id={}, user_id={}", session_id, user_id);

        Ok(())
    }

    pub async fn get_my_rsvp(&self, session_id: Uuid, user_id: &str) -> Result<Rsvp> {
        self.load_session(session_id).await?;

        self.store
            .find_rsvp(session_id, user_id)
            .await?
            .ok_or(AppError::Rejected(RejectionReason::RsvpNotFound))
    }

    pub async fn list_rsvps(&self, session_id: Uuid) -> Result<Vec<Rsvp>> {
        self.load_session(session_id).await?;
        self.store.list_rsvps(session_id).await
    }

    /// Record the user's physical attendance
    pub async fn check_in(
        &self,
        session_id: Uuid,
        user_id: &str,
        method: CheckInMethod,
        position: Option<Coordinate>,
        now: DateTime<Utc>,
    ) -> Result<Attendance> {
        let session = self.load_session(session_id).await?;

        if session.is_cancelled {
            return Err(RejectionReason::SessionCancelled.into());
        }
        if now < session.start_time - self.check_in.opens_before {
            return Err(RejectionReason::CheckInNotOpen.into());
        }
        if now > session.end_time + self.check_in.closes_after {
            return Err(RejectionReason::CheckInClosed.into());
        }
        if self.store.find_attendance(session_id, user_id).await?.is_some() {
            return Err(RejectionReason::AlreadyCheckedIn.into());
        }

        if method == CheckInMethod::Gps {
            if let (Some(venue), Some(position)) = (session.venue_coordinate(), position) {
                let distance = geo::haversine_km(venue, position);
                if distance > self.check_in.gps_radius_km {
                    tracing::debug!(
                        "GPS check-in rejected: session_id={}, distance={:.3}km",
                        session_id,
                        distance
                    );
                    return Err(RejectionReason::TooFarFromVenue.into());
                }
            }
        }

        let attendance = self
            .store
            .insert_attendance(session_id, user_id, method, now)
            .await?;

        tracing::info!(
            "Checked in: session_id={}, user_id={}, method={:?}",
            session_id,
            user_id,
            method
        );

        Ok(attendance)
    }

    /// Attendance list for the club's admins
    pub async fn list_attendance(
        &self,
        session_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Vec<Attendance>> {
        let session = self.load_session(session_id).await?;
        self.clubs.ensure_club_admin(session.club_id, user).await?;

        self.store.list_attendance(session_id).await
    }
}
