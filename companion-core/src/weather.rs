use std::sync::Arc;

use crate::{
    error::FetchError,
    icon::map_icon,
    model::{Coordinates, WeatherReading},
    provider::WeatherProvider,
};

/// Turns provider conditions into what the watch face shows.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherFetcher {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// One provider call, no retries.
    pub async fn fetch_current(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherReading, FetchError> {
        let conditions = self.provider.current_conditions(coordinates).await?;

        let temperature_c = round_half_up(conditions.temperature_c).ok_or_else(|| {
            FetchError::Parse(format!(
                "temperature {} is not representable",
                conditions.temperature_c
            ))
        })?;
        let icon = map_icon(conditions.weather_code, conditions.is_day)?;

        tracing::debug!(
            %coordinates,
            code = conditions.weather_code,
            is_day = conditions.is_day,
            temperature_c,
            "Fetched current weather"
        );

        Ok(WeatherReading { icon, temperature_c })
    }
}

/// Nearest whole degree, halves toward +∞ (-2.5 becomes -2).
fn round_half_up(value: f64) -> Option<i32> {
    // `f64::round` breaks ties away from zero; only negative halves differ.
    let nearest = value.round();
    let rounded = if (nearest - value).abs() == 0.5 {
        value.ceil()
    } else {
        nearest
    };
    if rounded.is_finite() && rounded >= f64::from(i32::MIN) && rounded <= f64::from(i32::MAX) {
        Some(rounded as i32)
    } else {
        None
    }
}
