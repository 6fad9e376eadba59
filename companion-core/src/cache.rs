//! Single-slot geocode cache.
//!
//! Only the most recent place-name lookup is remembered. A failed lookup is
//! stored as a tombstone and replayed forever for the same text; nothing here
//! expires by time.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{model::Coordinates, store::KeyValueStore};

pub const GEOCODE_CACHE_KEY: &str = "geocode_cache";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CachedOutcome {
    Success(Coordinates),
    /// The place was unknown or ambiguous.
    Failure,
}

/// On-disk shape of the slot.
#[derive(Debug, Serialize, Deserialize)]
struct CacheSlot {
    location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    failed: bool,
}

impl CacheSlot {
    fn new(location: &str, outcome: CachedOutcome) -> Self {
        match outcome {
            CachedOutcome::Success(c) => Self {
                location: location.to_owned(),
                latitude: Some(c.latitude()),
                longitude: Some(c.longitude()),
                failed: false,
            },
            CachedOutcome::Failure => Self {
                location: location.to_owned(),
                latitude: None,
                longitude: None,
                failed: true,
            },
        }
    }

    fn outcome(&self) -> Option<CachedOutcome> {
        if self.failed {
            return Some(CachedOutcome::Failure);
        }

        let coords = Coordinates::new(self.latitude?, self.longitude?).ok()?;
        Some(CachedOutcome::Success(coords))
    }
}

#[derive(Debug, Clone)]
pub struct GeocodeCache {
    store: Arc<dyn KeyValueStore>,
}

impl GeocodeCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored outcome for exactly `query`, if the slot holds it.
    pub fn get(&self, query: &str) -> Option<CachedOutcome> {
        let (location, outcome) = self.current()?;
        (location == query).then_some(outcome)
    }

    /// Replace the slot with `outcome` for `query`.
    pub fn put(&self, query: &str, outcome: CachedOutcome) {
        let slot = CacheSlot::new(query, outcome);

        let json = match serde_json::to_string(&slot) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize geocode cache slot: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(GEOCODE_CACHE_KEY, &json) {
            tracing::warn!("Failed to write geocode cache: {:#}", e);
        }
    }

    /// Whatever the slot holds, regardless of query text.
    pub fn current(&self) -> Option<(String, CachedOutcome)> {
        let raw = match self.store.get(GEOCODE_CACHE_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Failed to read geocode cache: {:#}", e);
                return None;
            }
        };

        let slot: CacheSlot = match serde_json::from_str(&raw) {
            Ok(slot) => slot,
            Err(e) => {
                tracing::warn!("Ignoring malformed geocode cache slot: {}", e);
                return None;
            }
        };

        let Some(outcome) = slot.outcome() else {
            tracing::warn!("Ignoring geocode cache slot without usable coordinates");
            return None;
        };

        Some((slot.location, outcome))
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        self.store.remove(GEOCODE_CACHE_KEY)
    }
}
