//! Club directory and nearby search.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/clubs/nearby` | No | Active clubs within a radius, nearest first |
//! | GET | `/api/clubs/{id}` | No | Club detail |
//! | PUT | `/api/admin/clubs/{id}/admins` | Super admin | Promote a user to club admin |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{ClubService, PgClubStore};
