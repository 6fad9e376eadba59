use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, ser::SerializeMap};

use crate::icon::IconId;

/// A validated point on the globe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Build coordinates, rejecting values outside `[-90, 90]` / `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> anyhow::Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            anyhow::bail!("latitude {latitude} is outside [-90, 90]");
        }
        if !(-180.0..=180.0).contains(&longitude) {
            anyhow::bail!("longitude {longitude} is outside [-180, 180]");
        }

        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lat:{}, lon:{}", self.latitude, self.longitude)
    }
}

/// A position fix reported by the device's geolocation source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coordinates: Coordinates,
    pub timestamp: DateTime<Utc>,
}

/// Raw current conditions as reported by a weather provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub weather_code: i32,
    pub is_day: bool,
}

/// What the watch face displays: one icon and a whole-degree temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherReading {
    pub icon: IconId,
    pub temperature_c: i32,
}

/// Message received from the watch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "weatherRequest", default)]
    weather_request: Option<serde_json::Value>,
}

impl InboundMessage {
    pub fn weather_request() -> Self {
        Self {
            weather_request: Some(serde_json::Value::Bool(true)),
        }
    }

    /// The watch sends the flag as a bool, an integer or a string depending on
    /// firmware, so any truthy value counts.
    pub fn requests_weather(&self) -> bool {
        use serde_json::Value;

        match &self.weather_request {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        }
    }
}

/// Message sent to the watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundMessage {
    Weather(WeatherReading),
    WeatherFailed,
    Ready,
}

impl Serialize for OutboundMessage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OutboundMessage::Weather(reading) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("weatherIconOrdinal", &reading.icon.ordinal())?;
                map.serialize_entry("weatherTemperature", &reading.temperature_c)?;
                map.end()
            }
            OutboundMessage::WeatherFailed => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("weatherFailed", &1)?;
                map.end()
            }
            OutboundMessage::Ready => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("jsReady", &1)?;
                map.end()
            }
        }
    }
}
