pub mod rsvp_dto;
pub mod session_dto;

pub use rsvp_dto::{AttendanceResponseDto, CheckInDto, RsvpResponseDto, SetRsvpDto};
pub use session_dto::{
    CreateSessionDto, ListSessionsQuery, RescheduleSessionDto, SessionDetailDto,
    SessionResponseDto,
};
