//! Failure kinds of the weather pipeline.
//!
//! The watch only ever learns "weather failed"; these types exist so the
//! companion can decide what to cache and what to log.

use thiserror::Error;

use crate::icon::UnknownConditionCode;

/// Errors from the device geolocation source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

/// Errors while turning a place name or the device into coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The geocoder returned zero or several candidates.
    #[error("Place '{query}' is unknown or ambiguous")]
    AmbiguousOrUnknownPlace { query: String },

    #[error("Geocoding request failed: {0}")]
    GeocodeTransport(String),

    #[error("Device location unavailable: {0}")]
    DeviceLocationUnavailable(#[from] LocationError),
}

impl ResolveError {
    /// Whether this outcome is remembered in the geocode cache. Transport
    /// errors are retried on the next identical request.
    pub fn is_cacheable(&self) -> bool {
        matches!(self, ResolveError::AmbiguousOrUnknownPlace { .. })
    }
}

/// Errors while fetching current weather for known coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Weather request failed: {0}")]
    Transport(String),

    #[error("Weather response could not be parsed: {0}")]
    Parse(String),
}

impl From<UnknownConditionCode> for FetchError {
    fn from(err: UnknownConditionCode) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// Any failure of a single inbound weather request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Could not read location preference: {0}")]
    Preference(String),
}
