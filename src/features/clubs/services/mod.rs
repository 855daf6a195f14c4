pub mod club_service;
pub mod club_store;

pub use club_service::{ClubService, NearbySearch};
pub use club_store::{ClubStore, PgClubStore};
