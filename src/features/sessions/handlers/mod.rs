pub mod rsvp_handler;
pub mod session_handler;

pub use rsvp_handler::*;
pub use session_handler::*;
