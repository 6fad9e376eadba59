//! Turning a place name or the device itself into coordinates.

use async_trait::async_trait;
use chrono::Utc;
use std::{fmt::Debug, sync::Arc, time::Duration};

use crate::{
    cache::{CachedOutcome, GeocodeCache},
    error::{LocationError, ResolveError},
    geocode::Geocoder,
    model::{Coordinates, Position},
};

/// How long to wait for a position fix.
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(5);
/// How old a previously obtained fix may be and still be accepted.
pub const DEFAULT_LOCATION_MAX_AGE: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub timeout: Duration,
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_LOCATION_TIMEOUT,
            maximum_age: DEFAULT_LOCATION_MAX_AGE,
        }
    }
}

/// The phone's geolocation source.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    /// Honour `options.maximum_age` when a recent fix is already at hand.
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Position, LocationError>;
}

/// A fixed position taken from configuration, for hosts without a GPS.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocationProvider {
    coordinates: Option<Coordinates>,
}

impl ConfiguredLocationProvider {
    pub fn new(coordinates: Option<Coordinates>) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl LocationProvider for ConfiguredLocationProvider {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Position, LocationError> {
        let coordinates = self.coordinates.ok_or_else(|| {
            LocationError::Unavailable("no device position configured".to_string())
        })?;

        Ok(Position {
            coordinates,
            timestamp: Utc::now(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    cache: GeocodeCache,
    geocoder: Arc<dyn Geocoder>,
    device: Arc<dyn LocationProvider>,
    options: PositionOptions,
}

impl LocationResolver {
    pub fn new(
        cache: GeocodeCache,
        geocoder: Arc<dyn Geocoder>,
        device: Arc<dyn LocationProvider>,
    ) -> Self {
        Self {
            cache,
            geocoder,
            device,
            options: PositionOptions::default(),
        }
    }

    pub fn with_position_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn cache(&self) -> &GeocodeCache {
        &self.cache
    }

    /// Resolve a user-entered place name.
    ///
    /// A cached outcome for the same text is replayed without touching the
    /// network, including a cached failure. Only a definite answer from the
    /// geocoder is cached; transport errors are not.
    pub async fn resolve_by_name(&self, query: &str) -> Result<Coordinates, ResolveError> {
        match self.cache.get(query) {
            Some(CachedOutcome::Success(coords)) => {
                tracing::debug!(query, %coords, "Geocode cache hit");
                return Ok(coords);
            }
            Some(CachedOutcome::Failure) => {
                tracing::debug!(query, "Geocode cache hit (failed lookup)");
                return Err(ResolveError::AmbiguousOrUnknownPlace {
                    query: query.to_owned(),
                });
            }
            None => {}
        }

        let candidates = self.geocoder.search(query, 1).await.map_err(|e| {
            tracing::warn!(query, "Geocoding failed: {:#}", e);
            ResolveError::GeocodeTransport(format!("{e:#}"))
        })?;

        match candidates.as_slice() {
            [coords] => {
                tracing::info!(query, %coords, "Geocoded place");
                self.cache.put(query, CachedOutcome::Success(*coords));
                Ok(*coords)
            }
            other => {
                tracing::warn!(
                    query,
                    candidates = other.len(),
                    "Geocoding needs exactly one candidate; remembering failure"
                );
                self.cache.put(query, CachedOutcome::Failure);
                Err(ResolveError::AmbiguousOrUnknownPlace {
                    query: query.to_owned(),
                })
            }
        }
    }

    /// Ask the device for its position, waiting at most the configured timeout.
    pub async fn resolve_by_device(&self) -> Result<Coordinates, ResolveError> {
        let position = tokio::time::timeout(
            self.options.timeout,
            self.device.current_position(&self.options),
        )
        .await
        .map_err(|_| LocationError::Timeout)??;

        let age = Utc::now().signed_duration_since(position.timestamp);
        tracing::debug!(
            coords = %position.coordinates,
            age_secs = age.num_seconds(),
            "Device position"
        );

        Ok(position.coordinates)
    }
}
