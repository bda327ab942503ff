//! Global constants for tb-cad

/// Shortest allowed member, in model units (millimetres)
pub const MIN_MEMBER_LENGTH: f64 = 1.0;

/// Slack on the parametric range [0, 1] before an on-member point is flagged
pub const ON_MEMBER_TOLERANCE: f64 = 1e-6;

/// Distance within which parallel constraint lines coincide (millimetres)
pub const COINCIDENT_TOLERANCE: f64 = 1e-6;

/// Position substituted for entities that cannot be resolved
pub const FALLBACK_POSITION: [f64; 2] = [0.0, 0.0];
