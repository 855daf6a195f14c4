pub mod session_service;
pub mod session_store;

pub use session_service::{SessionDetail, SessionService};
pub use session_store::{PgSessionStore, RsvpWrite, SessionStore};
