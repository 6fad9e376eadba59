use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{model::Coordinates, provider::truncate_body};

use super::Geocoder;

pub const DEFAULT_PHOTON_URL: &str = "https://photon.komoot.io/api";

/// Komoot Photon geocoder (OpenStreetMap data, no API key).
#[derive(Debug, Clone)]
pub struct PhotonGeocoder {
    base_url: String,
    http: Client,
}

impl PhotonGeocoder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }
}

impl Default for PhotonGeocoder {
    fn default() -> Self {
        Self::new(DEFAULT_PHOTON_URL)
    }
}

#[derive(Debug, Deserialize)]
struct PhotonResponse {
    features: Vec<PhotonFeature>,
}

#[derive(Debug, Deserialize)]
struct PhotonFeature {
    geometry: PhotonGeometry,
}

/// GeoJSON point, `[lon, lat]`.
#[derive(Debug, Deserialize)]
struct PhotonGeometry {
    coordinates: Vec<f64>,
}

impl PhotonGeometry {
    fn to_coordinates(&self) -> Result<Coordinates> {
        match self.coordinates.as_slice() {
            [lon, lat, ..] => Coordinates::new(*lat, *lon),
            other => Err(anyhow!("expected [lon, lat], got {other:?}")),
        }
    }
}

#[async_trait]
impl Geocoder for PhotonGeocoder {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Coordinates>> {
        tracing::debug!(query, limit, "Geocoding via Photon");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[("limit", limit.to_string().as_str()), ("q", query)])
            .send()
            .await
            .context("Failed to send request to Photon")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Photon response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Photon request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: PhotonResponse =
            serde_json::from_str(&body).context("Failed to parse Photon JSON")?;

        parsed
            .features
            .iter()
            .map(|f| {
                f.geometry
                    .to_coordinates()
                    .context("Photon feature has invalid coordinates")
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_is_lon_lat() {
        let g = PhotonGeometry {
            coordinates: vec![-21.94, 64.15],
        };
        let c = g.to_coordinates().unwrap();
        assert_eq!(c.latitude(), 64.15);
        assert_eq!(c.longitude(), -21.94);
    }

    #[test]
    fn short_geometry_is_rejected() {
        let g = PhotonGeometry {
            coordinates: vec![1.0],
        };
        assert!(g.to_coordinates().is_err());
    }
}
