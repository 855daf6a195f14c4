pub mod attendance;
pub mod rsvp;
pub mod session;

pub use attendance::{Attendance, CheckInMethod};
pub use rsvp::{Rsvp, RsvpCounts, RsvpStatus};
pub use session::{NewSession, Session, SessionSchedule};
