pub mod club;

pub use club::{Club, ClubFilters, ClubRole};
