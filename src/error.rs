// File: src/error.rs

/// Failures surfaced by the map interaction core.
///
/// None of these are fatal: every variant leaves the map and the current
/// mode usable, and retries are always user-initiated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// Save attempted with zero captured points. Rejected locally; the
    /// save request is never sent.
    EmptyGeometry,
    /// Route requested without both a start and an end point. Rejected
    /// locally.
    MissingEndpoints,
    /// A backend or service call failed (network, HTTP status, bad
    /// payload). No local state is mutated.
    Backend(String),
    /// A device capability (geolocation) is denied or unsupported.
    /// Degrades to manual input.
    Unavailable(String),
}

impl From<String> for MapError {
    fn from(e: String) -> Self {
        Self::Backend(e)
    }
}

impl From<&str> for MapError {
    fn from(e: &str) -> Self {
        Self::Backend(e.to_string())
    }
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::EmptyGeometry => write!(f, "no geometry captured yet"),
            MapError::MissingEndpoints => write!(f, "both start and end points are required"),
            MapError::Backend(s) => write!(f, "backend error: {}", s),
            MapError::Unavailable(s) => write!(f, "{} unavailable", s),
        }
    }
}

impl std::error::Error for MapError {}
