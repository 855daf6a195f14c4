//! Session scheduling, RSVPs and check-in.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/clubs/{id}/sessions` | No | Upcoming (or all) sessions of a club |
//! | POST | `/api/clubs/{id}/sessions` | Club admin | Schedule a session |
//! | GET | `/api/sessions/{id}` | No | Session detail with RSVP tallies |
//! | PATCH | `/api/sessions/{id}` | Club admin | Reschedule |
//! | POST | `/api/sessions/{id}/cancel` | Club admin | Cancel, keeping history |
//! | GET | `/api/sessions/{id}/rsvps` | No | All RSVPs |
//! | PUT | `/api/sessions/{id}/rsvp` | Yes | Create or replace own RSVP |
//! | GET | `/api/sessions/{id}/rsvp` | Yes | Own RSVP |
//! | DELETE | `/api/sessions/{id}/rsvp` | Yes | Withdraw own RSVP |
//! | POST | `/api/sessions/{id}/check-in` | Yes | Record attendance |
//! | GET | `/api/sessions/{id}/attendance` | Club admin | Attendance list |
//!
//! Business-rule failures answer with a stable code in `errors[0]`,
//! e.g. `SESSION_AT_CAPACITY` or `CHECK_IN_NOT_OPEN`.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{PgSessionStore, SessionService};
