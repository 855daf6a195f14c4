use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::shared::types::ApiResponse;

/// Business-rule rejections with a stable code the caller can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    ClubNotFound,
    SessionNotFound,
    RsvpNotFound,
    SessionCancelled,
    SessionAlreadyStarted,
    SessionAtCapacity,
    SessionHasAttendance,
    AlreadyCheckedIn,
    CheckInNotOpen,
    CheckInClosed,
    TooFarFromVenue,
}

impl RejectionReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::ClubNotFound => "CLUB_NOT_FOUND",
            RejectionReason::SessionNotFound => "SESSION_NOT_FOUND",
            RejectionReason::RsvpNotFound => "RSVP_NOT_FOUND",
            RejectionReason::SessionCancelled => "SESSION_CANCELLED",
            RejectionReason::SessionAlreadyStarted => "SESSION_ALREADY_STARTED",
            RejectionReason::SessionAtCapacity => "SESSION_AT_CAPACITY",
            RejectionReason::SessionHasAttendance => "SESSION_HAS_ATTENDANCE",
            RejectionReason::AlreadyCheckedIn => "ALREADY_CHECKED_IN",
            RejectionReason::CheckInNotOpen => "CHECK_IN_NOT_OPEN",
            RejectionReason::CheckInClosed => "CHECK_IN_CLOSED",
            RejectionReason::TooFarFromVenue => "TOO_FAR_FROM_VENUE",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::ClubNotFound => "Club not found",
            RejectionReason::SessionNotFound => "Session not found",
            RejectionReason::RsvpNotFound => "No RSVP found for this session",
            RejectionReason::SessionCancelled => "Session has been cancelled",
            RejectionReason::SessionAlreadyStarted => "Session has already started",
            RejectionReason::SessionAtCapacity => "Session is at capacity",
            RejectionReason::SessionHasAttendance => {
                "Session already has check-ins and cannot be cancelled"
            }
            RejectionReason::AlreadyCheckedIn => "Already checked in to this session",
            RejectionReason::CheckInNotOpen => "Check-in is not open yet",
            RejectionReason::CheckInClosed => "Check-in window has closed",
            RejectionReason::TooFarFromVenue => "Too far from the venue to check in",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RejectionReason::ClubNotFound
            | RejectionReason::SessionNotFound
            | RejectionReason::RsvpNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::CONFLICT,
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rejected: {0}")]
    Rejected(RejectionReason),
}

impl From<RejectionReason> for AppError {
    fn from(reason: RejectionReason) -> Self {
        AppError::Rejected(reason)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    None,
                )
            }
            AppError::Validation(ref msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                Some(vec![msg.clone()]),
            ),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Auth(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Unauthorized(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Forbidden(ref msg) => (StatusCode::FORBIDDEN, msg.clone(), None),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, msg.clone(), None),
            AppError::Rejected(reason) => (
                reason.status(),
                reason.message().to_string(),
                Some(vec![reason.code().to_string()]),
            ),
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

/// Convert database error to more specific AppError.
///
/// `on_unique` names the rejection a unique-constraint violation stands for;
/// races between a precondition check and the write surface as that rejection.
pub fn handle_db_error(e: sqlx::Error, on_unique: Option<RejectionReason>) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        // PostgreSQL unique violation
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23505")) {
            if let Some(reason) = on_unique {
                return AppError::Rejected(reason);
            }
            return AppError::Conflict("Record already exists".to_string());
        }

        // PostgreSQL foreign key violation
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23503")) {
            return AppError::BadRequest("Referenced record does not exist.".to_string());
        }
    }

    tracing::error!("Database error: {:?}", e);
    AppError::Database(e)
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_status_mapping() {
        assert_eq!(
            RejectionReason::RsvpNotFound.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RejectionReason::SessionAtCapacity.status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            RejectionReason::TooFarFromVenue.status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_rejection_code_matches_serde() {
        let json = serde_json::to_value(RejectionReason::CheckInNotOpen).unwrap();
        assert_eq!(json, RejectionReason::CheckInNotOpen.code());
    }

    #[test]
    fn test_rejected_response_carries_code() {
        let response = AppError::from(RejectionReason::AlreadyCheckedIn).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_non_database_error_passes_through() {
        let err = handle_db_error(sqlx::Error::RowNotFound, Some(RejectionReason::AlreadyCheckedIn));
        assert!(matches!(err, AppError::Database(_)));
    }
}
