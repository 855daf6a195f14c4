pub mod auth;
pub mod clubs;
pub mod sessions;
