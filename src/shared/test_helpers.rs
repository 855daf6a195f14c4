//! In-memory stores and fixtures for unit and route tests.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::{DateTime, Utc};
use fake::{faker::company::en::CompanyName, Fake};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::config::CheckInConfig;
use crate::core::error::{RejectionReason, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::clubs::models::{Club, ClubFilters, ClubRole};
use crate::features::clubs::services::{ClubService, ClubStore};
use crate::features::sessions::models::{
    Attendance, CheckInMethod, NewSession, Rsvp, RsvpCounts, RsvpStatus, Session,
    SessionSchedule,
};
use crate::features::sessions::routes as session_routes;
use crate::features::sessions::services::{RsvpWrite, SessionService, SessionStore};
use crate::shared::geo::{BoundingBox, Coordinate, EARTH_RADIUS_KM};

pub fn member(user_id: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: user_id.to_string(),
        roles: vec![],
    }
}

/// Active, unverified club at the given position with a generated name
pub fn club_at(lat: f64, lng: f64) -> Club {
    let now = Utc::now();
    Club {
        id: Uuid::now_v7(),
        name: CompanyName().fake(),
        description: None,
        city: None,
        country: None,
        latitude: lat,
        longitude: lng,
        is_active: true,
        beginner_friendly: false,
        is_verified: false,
        created_at: now,
        updated_at: now,
    }
}

/// Point `km` due north of `from`
pub fn offset_by_km(from: Coordinate, km: f64) -> Coordinate {
    let degrees = km * 180.0 / (PI * EARTH_RADIUS_KM);
    Coordinate::new(from.lat() + degrees, from.lng()).unwrap()
}

/// Wrap a router so every request carries `user`, standing in for the JWT middleware
pub fn with_user(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}

/// Public and protected session routes, authenticated as `user` when given
pub fn session_app(service: Arc<SessionService>, user: Option<AuthenticatedUser>) -> Router {
    let protected = session_routes::protected_routes(service.clone());
    let protected = match user {
        Some(user) => with_user(protected, user),
        None => protected,
    };

    Router::new()
        .merge(session_routes::public_routes(service))
        .merge(protected)
}

/// Session service over in-memory stores with one club administered by `admin`
pub async fn session_fixture(
    admin: &str,
) -> (Arc<SessionService>, Arc<InMemorySessionStore>, Uuid) {
    let clubs = Arc::new(InMemoryClubStore::default());
    let club_id = clubs.insert(club_at(-33.8688, 151.2093)).await;
    clubs.set_member_role(club_id, admin, ClubRole::Admin).await.unwrap();

    let store = Arc::new(InMemorySessionStore::default());
    let service = SessionService::new(
        store.clone(),
        Arc::new(ClubService::new(clubs)),
        CheckInConfig::default(),
    );

    (Arc::new(service), store, club_id)
}

pub async fn session_service(admin: &str) -> (Arc<SessionService>, Uuid) {
    let (service, _, club_id) = session_fixture(admin).await;
    (service, club_id)
}

#[derive(Default)]
pub struct InMemoryClubStore {
    clubs: Mutex<HashMap<Uuid, Club>>,
    members: Mutex<HashMap<(Uuid, String), ClubRole>>,
}

impl InMemoryClubStore {
    pub async fn insert(&self, club: Club) -> Uuid {
        let id = club.id;
        self.clubs.lock().await.insert(id, club);
        id
    }
}

#[async_trait]
impl ClubStore for InMemoryClubStore {
    async fn find_in_bounds(
        &self,
        bounds: &BoundingBox,
        filters: &ClubFilters,
    ) -> Result<Vec<Club>> {
        let clubs = self.clubs.lock().await;
        Ok(clubs
            .values()
            .filter(|club| club.is_active && filters.matches(club))
            .filter(|club| {
                club.coordinate()
                    .map(|position| bounds.contains(position))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Club>> {
        Ok(self.clubs.lock().await.get(&id).cloned())
    }

    async fn member_role(&self, club_id: Uuid, user_id: &str) -> Result<Option<ClubRole>> {
        let members = self.members.lock().await;
        Ok(members.get(&(club_id, user_id.to_string())).copied())
    }

    async fn set_member_role(&self, club_id: Uuid, user_id: &str, role: ClubRole) -> Result<()> {
        self.members
            .lock()
            .await
            .insert((club_id, user_id.to_string()), role);
        Ok(())
    }
}

#[derive(Default)]
struct SessionTables {
    sessions: HashMap<Uuid, Session>,
    rsvps: Vec<Rsvp>,
    attendances: Vec<Attendance>,
}

impl SessionTables {
    fn yes_excluding(&self, session_id: Uuid, user_id: &str) -> i64 {
        self.rsvps
            .iter()
            .filter(|r| {
                r.session_id == session_id && r.status == RsvpStatus::Yes && r.user_id != user_id
            })
            .count() as i64
    }
}

/// Session store whose every operation runs under one lock, so check-then-write is atomic
#[derive(Default)]
pub struct InMemorySessionStore {
    tables: Mutex<SessionTables>,
}

impl InMemorySessionStore {
    pub async fn yes_count(&self, session_id: Uuid) -> i64 {
        self.tables.lock().await.yes_excluding(session_id, "")
    }

    pub async fn attendance_count(&self, session_id: Uuid) -> usize {
        let tables = self.tables.lock().await;
        tables
            .attendances
            .iter()
            .filter(|a| a.session_id == session_id)
            .count()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, new: &NewSession) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::now_v7(),
            club_id: new.club_id,
            title: new.title.clone(),
            description: new.description.clone(),
            venue_name: new.venue_name.clone(),
            venue_latitude: new.venue.map(|c| c.lat()),
            venue_longitude: new.venue.map(|c| c.lng()),
            start_time: new.schedule.start_time(),
            end_time: new.schedule.end_time(),
            max_attendees: new.max_attendees,
            is_cancelled: false,
            cancelled_at: None,
            created_by: new.created_by.clone(),
            created_at: now,
            updated_at: now,
        };

        self.tables
            .lock()
            .await
            .sessions
            .insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_session(&self, id: Uuid) -> Result<Option<Session>> {
        Ok(self.tables.lock().await.sessions.get(&id).cloned())
    }

    async fn list_club_sessions(
        &self,
        club_id: Uuid,
        ending_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Session>> {
        let tables = self.tables.lock().await;
        let mut sessions: Vec<Session> = tables
            .sessions
            .values()
            .filter(|s| s.club_id == club_id)
            .filter(|s| ending_after.is_none_or(|after| s.end_time > after))
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.start_time);
        Ok(sessions)
    }

    async fn reschedule_session(
        &self,
        id: Uuid,
        schedule: SessionSchedule,
    ) -> Result<Option<Session>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .sessions
            .get_mut(&id)
            .filter(|s| !s.is_cancelled)
            .map(|s| {
                s.start_time = schedule.start_time();
                s.end_time = schedule.end_time();
                s.updated_at = Utc::now();
                s.clone()
            }))
    }

    async fn cancel_session(&self, id: Uuid, at: DateTime<Utc>) -> Result<Session> {
        let mut tables = self.tables.lock().await;
        let has_attendance = tables.attendances.iter().any(|a| a.session_id == id);

        let session = tables
            .sessions
            .get_mut(&id)
            .ok_or(RejectionReason::SessionNotFound)?;
        if session.is_cancelled {
            return Err(RejectionReason::SessionCancelled.into());
        }
        if has_attendance {
            return Err(RejectionReason::SessionHasAttendance.into());
        }

        session.is_cancelled = true;
        session.cancelled_at = Some(at);
        session.updated_at = Utc::now();
        Ok(session.clone())
    }

    async fn find_rsvp(&self, session_id: Uuid, user_id: &str) -> Result<Option<Rsvp>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .rsvps
            .iter()
            .find(|r| r.session_id == session_id && r.user_id == user_id)
            .cloned())
    }

    async fn list_rsvps(&self, session_id: Uuid) -> Result<Vec<Rsvp>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .rsvps
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn count_rsvps(&self, session_id: Uuid) -> Result<RsvpCounts> {
        let tables = self.tables.lock().await;
        let mut counts = RsvpCounts::default();
        for rsvp in tables.rsvps.iter().filter(|r| r.session_id == session_id) {
            match rsvp.status {
                RsvpStatus::Yes => counts.yes += 1,
                RsvpStatus::No => counts.no += 1,
                RsvpStatus::Maybe => counts.maybe += 1,
            }
        }
        Ok(counts)
    }

    async fn upsert_rsvp(&self, write: &RsvpWrite) -> Result<Rsvp> {
        let mut tables = self.tables.lock().await;

        let session = tables
            .sessions
            .get(&write.session_id)
            .ok_or(RejectionReason::SessionNotFound)?;
        if session.is_cancelled {
            return Err(RejectionReason::SessionCancelled.into());
        }
        if session.has_started(write.now) {
            return Err(RejectionReason::SessionAlreadyStarted.into());
        }
        if let (Some(max), RsvpStatus::Yes) = (session.max_attendees, write.status) {
            if tables.yes_excluding(write.session_id, &write.user_id) >= i64::from(max) {
                return Err(RejectionReason::SessionAtCapacity.into());
            }
        }

        let now = Utc::now();
        let existing = tables
            .rsvps
            .iter_mut()
            .find(|r| r.session_id == write.session_id && r.user_id == write.user_id);

        if let Some(rsvp) = existing {
            rsvp.status = write.status;
            rsvp.note = write.note.clone();
            rsvp.updated_at = now;
            return Ok(rsvp.clone());
        }

        let rsvp = Rsvp {
            id: Uuid::now_v7(),
            session_id: write.session_id,
            user_id: write.user_id.clone(),
            status: write.status,
            note: write.note.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.rsvps.push(rsvp.clone());
        Ok(rsvp)
    }

    async fn delete_rsvp(&self, session_id: Uuid, user_id: &str) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.rsvps.len();
        tables
            .rsvps
            .retain(|r| !(r.session_id == session_id && r.user_id == user_id));
        Ok(tables.rsvps.len() < before)
    }

    async fn find_attendance(
        &self,
        session_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Attendance>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .attendances
            .iter()
            .find(|a| a.session_id == session_id && a.user_id == user_id)
            .cloned())
    }

    async fn list_attendance(&self, session_id: Uuid) -> Result<Vec<Attendance>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .attendances
            .iter()
            .filter(|a| a.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn insert_attendance(
        &self,
        session_id: Uuid,
        user_id: &str,
        method: CheckInMethod,
        at: DateTime<Utc>,
    ) -> Result<Attendance> {
        let mut tables = self.tables.lock().await;

        match tables.sessions.get(&session_id) {
            None => return Err(RejectionReason::SessionNotFound.into()),
            Some(s) if s.is_cancelled => return Err(RejectionReason::SessionCancelled.into()),
            Some(_) => {}
        }
        if tables
            .attendances
            .iter()
            .any(|a| a.session_id == session_id && a.user_id == user_id)
        {
            return Err(RejectionReason::AlreadyCheckedIn.into());
        }

        let attendance = Attendance {
            id: Uuid::now_v7(),
            session_id,
            user_id: user_id.to_string(),
            method,
            checked_in_at: at,
        };
        tables.attendances.push(attendance.clone());
        Ok(attendance)
    }
}
