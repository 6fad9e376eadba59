use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::FetchError,
    model::{Coordinates, CurrentConditions},
};

use super::{WeatherProvider, truncate_body};

pub const DEFAULT_OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_FIELDS: &str = "temperature_2m,weather_code,is_day";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }
}

impl Default for OpenMeteoProvider {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN_METEO_URL)
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    weather_code: i32,
    is_day: u8,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current: OmCurrent,
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn current_conditions(
        &self,
        coordinates: Coordinates,
    ) -> Result<CurrentConditions, FetchError> {
        let latitude = coordinates.latitude().to_string();
        let longitude = coordinates.longitude().to_string();

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
            ])
            .send()
            .await
            .map_err(|e| {
                FetchError::Transport(format!("Failed to send request to Open-Meteo: {e}"))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            FetchError::Transport(format!("Failed to read Open-Meteo response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(FetchError::Transport(format!(
                "Open-Meteo request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: OmResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::Parse(format!("Failed to parse Open-Meteo JSON: {e}")))?;

        Ok(CurrentConditions {
            temperature_c: parsed.current.temperature_2m,
            weather_code: parsed.current.weather_code,
            is_day: parsed.current.is_day != 0,
        })
    }
}
