// =============================================================================
// NEARBY SEARCH
// =============================================================================

/// Radius used when the caller does not pass one
pub const DEFAULT_SEARCH_RADIUS_KM: f64 = 25.0;

/// Largest accepted search radius
pub const MAX_SEARCH_RADIUS_KM: f64 = 500.0;

/// Result count used when the caller does not pass a limit
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Largest accepted result limit
pub const MAX_SEARCH_LIMIT: u32 = 100;

// =============================================================================
// SESSIONS
// =============================================================================

/// Maximum length of an RSVP note
pub const MAX_RSVP_NOTE_LENGTH: u64 = 500;
