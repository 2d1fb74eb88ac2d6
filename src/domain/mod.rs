// Domain layer - Readings, planes and layout
pub mod bit_plane;
pub mod layout;
pub mod reading;
pub mod staleness;
pub mod telemetry_source;
