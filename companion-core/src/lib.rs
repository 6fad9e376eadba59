//! Core library of the watch weather companion.
//!
//! This crate defines:
//! - Location resolution (place-name geocoding with a single-slot cache, or device position)
//! - Current-weather fetching and the condition code to watch icon mapping
//! - The request orchestrator that answers each watch request with exactly one message
//! - Configuration and the key-value store that persists preferences and the cache
//!
//! It is used by `companion-cli`, but the orchestrator only depends on the
//! [`DeviceChannel`], [`LocationProvider`] and [`KeyValueStore`] traits, so any
//! other host can drive it.

pub mod cache;
pub mod channel;
pub mod config;
pub mod error;
pub mod geocode;
pub mod icon;
pub mod location;
pub mod model;
pub mod orchestrator;
pub mod preferences;
pub mod provider;
pub mod store;
pub mod weather;

pub use cache::{CachedOutcome, GeocodeCache};
pub use channel::DeviceChannel;
pub use config::Config;
pub use error::{FetchError, LocationError, RequestError, ResolveError};
pub use geocode::{Geocoder, PhotonGeocoder};
pub use icon::{IconCategory, IconId, map_icon};
pub use location::{ConfiguredLocationProvider, LocationProvider, LocationResolver, PositionOptions};
pub use model::{Coordinates, InboundMessage, OutboundMessage, Position, WeatherReading};
pub use orchestrator::RequestOrchestrator;
pub use preferences::Preferences;
pub use provider::{OpenMeteoProvider, WeatherProvider};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use weather::WeatherFetcher;
