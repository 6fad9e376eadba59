use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::Coordinates;

pub mod photon;

pub use photon::PhotonGeocoder;

/// Forward geocoding: free text to candidate coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Ask for at most `limit` candidates. Any error is a transport-level
    /// failure; an empty list means the place is unknown.
    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<Coordinates>>;
}
